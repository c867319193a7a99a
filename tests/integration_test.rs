use perseus_bg::{
    bayesian_game::solvers::BgSolverType,
    belief::{Belief, BeliefSet, JointBelief, SamplingPolicy},
    export::PomdpExporter,
    model::{problems, DecPomdpModel},
    planner::{BackupType, Perseus, PerseusConfig, PlanningStatistics, Termination},
    simulation::{BgPolicyAgent, Simulator},
    value_function::QFunctions,
};
use ndarray::array;
use tempfile::tempdir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_end_to_end_dec_tiger() {
    init_logging();
    let model = problems::dec_tiger().unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(50)
        .belief_sampling(SamplingPolicy::Qmdp)
        .max_iterations(15)
        .am_restarts(3)
        .threads(2)
        .dryrun(true)
        .build()
        .unwrap();
    let mut planner = Perseus::new(&model, config).unwrap();
    let q = planner.plan().unwrap().clone();

    let b0 = model.initial_belief();
    let values = planner.statistics().values();
    // the initial belief is part of the sampled set
    for pair in values.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-9);
    }
    let lower_bound = -101.0 / (1.0 - model.discount());
    assert!(q.value(&b0) >= lower_bound - 1e-6);
    assert_eq!(values.last().copied(), Some(q.value(&b0)));

    let agent = BgPolicyAgent::new(&model, &q, BgSolverType::Exhaustive).unwrap();
    let result = Simulator::new(20, 4, 1).unwrap().run(&model, &agent).unwrap();
    assert_eq!(result.discounted.count, 20);
    assert!(result.mean_discounted().is_finite());
}

#[test]
fn test_persistence_of_results() {
    init_logging();
    let dir = tempdir().unwrap();
    let model = problems::state_matching(0.9).unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(8)
        .max_iterations(3)
        .output_dir(dir.path())
        .build()
        .unwrap();
    let mut planner = Perseus::new(&model, config.clone()).unwrap();
    let q = planner.plan().unwrap().clone();

    for file in ["value_function.txt", "q_functions.bin", "beliefs.txt", "statistics.json", "config.json"] {
        assert!(dir.path().join(file).exists(), "missing {}", file);
    }
    let iterations = planner.statistics().nr_iterations();
    assert!(dir.path().join(format!("value_function_{:04}.txt", iterations)).exists());

    let from_text = QFunctions::load_text(dir.path().join("value_function.txt"), 2, 4).unwrap();
    assert_eq!(from_text, q);
    assert_eq!(QFunctions::load(dir.path().join("q_functions.bin")).unwrap(), q);
    assert_eq!(
        BeliefSet::load_text(dir.path().join("beliefs.txt"), 2).unwrap(),
        *planner.belief_set().unwrap()
    );
    let stats = PlanningStatistics::load(dir.path().join("statistics.json")).unwrap();
    assert_eq!(stats.nr_iterations(), iterations);
    assert_eq!(PerseusConfig::load(dir.path().join("config.json")).unwrap(), config);
}

#[test]
fn test_finite_horizon_state_matching() {
    init_logging();
    let model = problems::state_matching(1.0).unwrap();
    let beliefs = BeliefSet::from_beliefs(vec![
        Belief::uniform(2),
        Belief::from_probabilities(array![1.0, 0.0]),
        Belief::from_probabilities(array![0.0, 1.0]),
    ])
    .unwrap();
    for backup_type in [BackupType::OnlyKeepMax, BackupType::StoreAll] {
        let config = PerseusConfig::builder()
            .horizon(2)
            .bg_solver(BgSolverType::Exhaustive)
            .backup_type(backup_type)
            .dryrun(true)
            .build()
            .unwrap();
        let mut planner = Perseus::new(&model, config)
            .unwrap()
            .with_belief_set(beliefs.clone())
            .unwrap();
        let q = planner.plan().unwrap();
        let a00 = model.individual_to_joint_action(&[0, 0]);
        assert!((q.q_value(&Belief::uniform(2), a00) - 1.5).abs() < 1e-12);
        assert_eq!(planner.statistics().termination, Some(Termination::HorizonReached));
    }
}

#[test]
fn test_convergence_on_small_problem() {
    init_logging();
    let model = problems::state_matching(0.5).unwrap();
    let config = PerseusConfig::builder()
        .nr_beliefs(10)
        .max_iterations(200)
        .convergence_threshold(1e-6)
        .convergence_patience(2)
        .bg_solver(BgSolverType::Exhaustive)
        .dryrun(true)
        .build()
        .unwrap();
    let mut planner = Perseus::new(&model, config).unwrap();
    let q = planner.plan().unwrap().clone();
    assert_eq!(planner.statistics().termination, Some(Termination::Converged));
    // full observability after one step: 0.5 now, then 1 per step discounted
    let v = q.value(&model.initial_belief());
    assert!(v <= 0.5 + 0.5 * 1.0 / (1.0 - 0.5) + 1e-6);
    assert!(v > 0.0);
}

#[test]
fn test_reproducible_runs() {
    let model = problems::random(5, vec![2, 3], vec![2, 2], 0.9, 21).unwrap();
    let plan = |seed: u64, threads: usize| {
        let config = PerseusConfig::builder()
            .nr_beliefs(15)
            .max_iterations(3)
            .am_restarts(2)
            .random_seed(seed)
            .threads(threads)
            .dryrun(true)
            .build()
            .unwrap();
        let mut planner = Perseus::new(&model, config).unwrap();
        let q = planner.plan().unwrap().clone();
        (q, planner.belief_set().unwrap().clone())
    };
    let (q1, b1) = plan(5, 1);
    let (q2, b2) = plan(5, 3);
    assert_eq!(b1, b2);
    assert_eq!(q1, q2);
    let b0 = model.initial_belief();
    assert!(b1.iter().next().map(|b| b == &b0).unwrap_or(false));
}

#[test]
fn test_pomdp_export() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dectiger.POMDP");
    let model = problems::dec_tiger().unwrap();
    PomdpExporter::export(&model, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let o_lines = text.lines().filter(|l| l.starts_with("O:")).count();
    // every joint action / next state pair observes four joint observations
    assert_eq!(o_lines, 9 * 2 * 4);
    assert!(model.initial_belief().sanity_check(1e-9).is_ok());
}
