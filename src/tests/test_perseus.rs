use ndarray::array;

use crate::bayesian_game::solvers::BgSolverType;
use crate::belief::{Belief, BeliefSet, JointBelief};
use crate::model::{problems, DecPomdpModel};
use crate::planner::{BackupType, InitializeWith, Perseus, PerseusConfig, Termination};
use crate::value_function::QFunctions;

fn matching_beliefs() -> BeliefSet {
    BeliefSet::from_beliefs(vec![
        Belief::uniform(2),
        Belief::from_probabilities(array![1.0, 0.0]),
        Belief::from_probabilities(array![0.0, 1.0]),
    ])
    .unwrap()
}

#[test]
fn test_state_matching_two_stages() {
    let model = problems::state_matching(1.0).unwrap();
    let config = PerseusConfig::builder()
        .horizon(2)
        .bg_solver(BgSolverType::Exhaustive)
        .dryrun(true)
        .build()
        .unwrap();
    let mut planner = Perseus::new(&model, config).unwrap().with_belief_set(matching_beliefs()).unwrap();
    let q = planner.plan().unwrap();

    let b0 = Belief::uniform(2);
    let a00 = model.individual_to_joint_action(&[0, 0]);
    let a11 = model.individual_to_joint_action(&[1, 1]);
    assert!((q.q_value(&b0, a00) - 1.5).abs() < 1e-12);
    assert!((q.q_value(&b0, a11) - 1.5).abs() < 1e-12);
    // matching now, then matching the observed state
    let best = q.maximizing_vector(&b0, a00).unwrap();
    assert_eq!(best.values(), array![2.0, 1.0].view());

    let stats = planner.statistics();
    assert_eq!(stats.nr_iterations(), 2);
    assert_eq!(stats.termination, Some(Termination::HorizonReached));
    assert!((stats.values()[0] - 0.5).abs() < 1e-12);
    assert!((stats.values()[1] - 1.5).abs() < 1e-12);
}

#[test]
fn test_one_stage_is_immediate_reward() {
    let model = problems::dec_tiger().unwrap().with_discount(1.0).unwrap();
    let config = PerseusConfig::builder().horizon(1).nr_beliefs(5).dryrun(true).build().unwrap();
    let mut planner = Perseus::new(&model, config).unwrap();
    let q = planner.plan().unwrap();
    for a in 0..model.nr_joint_actions() {
        assert!(q.action(a).iter().all(|alpha| alpha.values() == model.reward_vector(a).view()));
    }
}

#[test]
fn test_value_never_decreases_at_sampled_beliefs() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(30)
        .max_iterations(1)
        .min_iterations(1)
        .am_restarts(2)
        .dryrun(true)
        .build()
        .unwrap();

    let mut planner = Perseus::new(&model, config.clone()).unwrap();
    planner.plan().unwrap();
    let beliefs = planner.belief_set().unwrap().clone();
    let mut q: QFunctions = planner.q_functions().unwrap().clone();

    for _ in 0..6 {
        let mut planner = Perseus::new(&model, config.clone())
            .unwrap()
            .with_belief_set(beliefs.clone())
            .unwrap()
            .with_initial_q_functions(q.clone())
            .unwrap();
        let next = planner.plan().unwrap().clone();
        for b in beliefs.iter() {
            assert!(next.value(b) >= q.value(b) - 1e-9);
        }
        q = next;
    }
}

#[test]
fn test_same_result_for_every_thread_count() {
    let model = problems::random(4, vec![2, 2], vec![2, 2], 0.9, 13).unwrap();
    let run = |threads: usize| {
        let config = PerseusConfig::builder()
            .nr_beliefs(20)
            .max_iterations(4)
            .am_restarts(3)
            .threads(threads)
            .random_seed(7)
            .dryrun(true)
            .build()
            .unwrap();
        let mut planner = Perseus::new(&model, config).unwrap();
        planner.plan().unwrap().clone()
    };
    let sequential = run(1);
    assert_eq!(sequential, run(4));
    assert_eq!(sequential, run(1));
}

#[test]
fn test_vector_for_each_belief_backs_up_everything() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(10)
        .max_iterations(3)
        .compute_vector_for_each_belief(true)
        .dryrun(true)
        .build()
        .unwrap();
    let mut planner = Perseus::new(&model, config).unwrap();
    planner.plan().unwrap();
    assert!(planner
        .statistics()
        .iterations
        .iter()
        .all(|s| s.nr_backed_up_beliefs == 10));
}

#[test]
fn test_store_all_keeps_at_least_the_best_vectors() {
    let model = problems::dec_tiger().unwrap();
    let beliefs = BeliefSet::from_beliefs(vec![
        model.initial_belief(),
        Belief::from_probabilities(array![0.85, 0.15]),
        Belief::from_probabilities(array![0.3, 0.7]),
        Belief::from_probabilities(array![0.97, 0.03]),
    ])
    .unwrap();
    let plan = |backup_type| {
        let config = PerseusConfig::builder()
            .horizon(2)
            .backup_type(backup_type)
            .bg_solver(BgSolverType::Exhaustive)
            .dryrun(true)
            .build()
            .unwrap();
        let mut planner = Perseus::new(&model, config)
            .unwrap()
            .with_belief_set(beliefs.clone())
            .unwrap();
        planner.plan().unwrap().clone()
    };
    let keep_max = plan(BackupType::OnlyKeepMax);
    let store_all = plan(BackupType::StoreAll);
    assert!(store_all.nr_vectors() >= keep_max.nr_vectors());
    for b in beliefs.iter() {
        for a in 0..model.nr_joint_actions() {
            assert!(store_all.q_value(b, a) >= keep_max.q_value(b, a) - 1e-9);
        }
    }
}

#[test]
fn test_initializations_are_honoured() {
    let model = problems::dec_tiger().unwrap();
    for (init, expected) in [
        (InitializeWith::Zero, 0.0),
        (InitializeWith::ImmediateReward, -2.0),
        (InitializeWith::LowerBound, -101.0 / (1.0 - 0.95)),
    ] {
        let q = crate::planner::initial_q_functions(&model, init);
        let v = q.value(&model.initial_belief());
        assert!((v - expected).abs() < 1e-6, "{:?}: {} vs {}", init, v, expected);
    }
}

#[test]
fn test_beliefs_are_normalized() {
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder().nr_beliefs(40).max_iterations(1).dryrun(true).build().unwrap();
    let mut planner = Perseus::new(&model, config).unwrap();
    planner.plan().unwrap();
    for b in planner.belief_set().unwrap().iter() {
        let total: f64 = b.to_dense().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
