use ndarray::array;

use crate::belief::{Belief, BeliefSet, DenseBelief};
use crate::error::PlannerError;
use crate::model::{problems, DecPomdpModel};
use crate::planner::{Perseus, PerseusConfig};
use crate::value_function::QFunctions;

#[test]
fn test_empty_belief_set_is_rejected() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder().dryrun(true).build().unwrap();
    let mut planner = Perseus::new(&model, config)
        .unwrap()
        .with_belief_set(BeliefSet::from_beliefs(vec![]).unwrap())
        .unwrap();
    assert!(matches!(planner.plan(), Err(PlannerError::InvalidParameter { .. })));
}

#[test]
fn test_unnormalized_belief_aborts_the_run() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder().dryrun(true).build().unwrap();
    let beliefs = BeliefSet::from_beliefs(vec![Belief::Dense(DenseBelief::new(array![0.5, 0.4]))]).unwrap();
    let mut planner = Perseus::new(&model, config).unwrap().with_belief_set(beliefs).unwrap();
    assert!(matches!(planner.plan(), Err(PlannerError::ModelInconsistency { .. })));
    assert!(planner.q_functions().is_none());
}

#[test]
fn test_failed_run_keeps_supplied_inputs() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder().max_iterations(2).dryrun(true).build().unwrap();
    let beliefs = BeliefSet::from_beliefs(vec![Belief::Dense(DenseBelief::new(array![0.5, 0.4]))]).unwrap();
    let start = QFunctions::zero(2, model.nr_joint_actions());
    let mut planner = Perseus::new(&model, config)
        .unwrap()
        .with_belief_set(beliefs.clone())
        .unwrap()
        .with_initial_q_functions(start.clone())
        .unwrap();

    assert!(planner.plan().is_err());
    assert_eq!(planner.belief_set(), Some(&beliefs));
    assert_eq!(planner.q_functions(), Some(&start));
    // a retry sees the same broken set instead of sampling a new one
    assert!(matches!(planner.plan(), Err(PlannerError::ModelInconsistency { .. })));
    assert_eq!(planner.belief_set().map(|b| b.len()), Some(1));
}

#[test]
fn test_mismatched_dimensions() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder().dryrun(true).build().unwrap();
    let beliefs = BeliefSet::from_beliefs(vec![Belief::uniform(3)]).unwrap();
    assert!(matches!(
        Perseus::new(&model, config.clone()).unwrap().with_belief_set(beliefs),
        Err(PlannerError::DimensionMismatch { .. })
    ));
    assert!(Perseus::new(&model, config)
        .unwrap()
        .with_initial_q_functions(QFunctions::zero(2, 4))
        .is_err());
}

#[test]
fn test_dryrun_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run");
    let model = problems::state_matching(0.9).unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(5)
        .max_iterations(2)
        .output_dir(&out)
        .dryrun(true)
        .build()
        .unwrap();
    Perseus::new(&model, config).unwrap().plan().unwrap();
    assert!(!out.exists());
}

#[test]
fn test_time_limit_stops_early() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(10)
        .max_iterations(50)
        .convergence_threshold(0.0)
        .time_limit_secs(1e-9)
        .dryrun(true)
        .build()
        .unwrap();
    let mut planner = Perseus::new(&model, config).unwrap();
    planner.plan().unwrap();
    assert_eq!(planner.statistics().nr_iterations(), 1);
    assert_eq!(
        planner.statistics().termination,
        Some(crate::planner::Termination::TimeLimit)
    );
}
