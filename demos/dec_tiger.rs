/***
# Dec-Tiger

* Plans a joint policy for the two-agent Dec-Tiger problem with Perseus
  using Bayesian-game backups, then evaluates it by simulation.
* Run with `RUST_LOG=info cargo run --example dec_tiger` to follow the
  iterations.
***/

use perseus_bg::{
    bayesian_game::solvers::BgSolverType,
    belief::SamplingPolicy,
    model::{problems, DecPomdpModel},
    planner::{Perseus, PerseusConfig},
    simulation::{BgPolicyAgent, Simulator},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Dec-Tiger with Perseus and Bayesian-game backups ===\n");

    let model = problems::dec_tiger()?;
    let config = PerseusConfig::builder()
        .nr_beliefs(200)
        .belief_sampling(SamplingPolicy::Qmdp)
        .bg_solver(BgSolverType::AlternatingMaximization { restarts: 10 })
        .max_iterations(60)
        .threads(4)
        .dryrun(true)
        .build()?;

    let mut planner = Perseus::new(&model, config)?;
    let q = planner.plan()?.clone();
    let stats = planner.statistics();
    println!(
        "Planned {} iterations ({:?}), {} vectors",
        stats.nr_iterations(),
        stats.termination,
        q.nr_vectors()
    );
    println!("V(b0) = {:.4}\n", q.value(&model.initial_belief()));

    for horizon in [3, 4, 5] {
        let agent = BgPolicyAgent::new(&model, &q, BgSolverType::Exhaustive)?;
        let result = Simulator::new(1000, horizon, 42)?.run(&model, &agent)?;
        println!(
            "horizon {}: mean discounted return {:.4}, undiscounted {:.4}",
            horizon,
            result.mean_discounted(),
            result.mean_undiscounted()
        );
    }
    Ok(())
}
