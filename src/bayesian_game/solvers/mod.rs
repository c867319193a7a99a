//! Solvers for identical-payoff Bayesian games.
//!
//! Both solvers are deterministic given the random number generator they are
//! handed; the planner gives every backup its own seeded generator.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{BayesianGameIdenticalPayoff, JointPolicy};
use crate::error::Result;

pub mod alternating_maximization;
pub mod exhaustive;

pub use alternating_maximization::AlternatingMaximization;
pub use exhaustive::ExhaustiveSolver;

/// Improvements smaller than this do not count as a change
pub(crate) const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// Best joint policy found, plus every evaluated candidate when requested
#[derive(Clone, Debug)]
pub struct BgSolution {
    pub value: f64,
    pub policy: JointPolicy,
    /// `(policy, value)` pairs; empty unless the solver keeps candidates
    pub candidates: Vec<(JointPolicy, f64)>,
}

impl BgSolution {
    /// Every distinct policy the solver recorded, the best one included
    pub fn distinct_policies(&self) -> Vec<&JointPolicy> {
        let mut out: Vec<&JointPolicy> = vec![&self.policy];
        for (policy, _) in &self.candidates {
            if !out.contains(&policy) {
                out.push(policy);
            }
        }
        out
    }
}

/// Core trait for Bayesian game solvers
pub trait BgSolver: Send + Sync {
    /// Find a joint policy of maximal (or locally maximal) expected payoff.
    fn solve(&self, bg: &BayesianGameIdenticalPayoff, rng: &mut dyn RngCore) -> Result<BgSolution>;

    fn name(&self) -> &'static str;
}

/// Solver selection as it appears in a planner configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BgSolverType {
    Exhaustive,
    AlternatingMaximization { restarts: usize },
}

impl BgSolverType {
    /// Instantiate the solver, recording candidates when `keep_candidates`.
    pub fn solver(&self, keep_candidates: bool) -> Box<dyn BgSolver> {
        match *self {
            BgSolverType::Exhaustive => Box::new(ExhaustiveSolver::new().keep_candidates(keep_candidates)),
            BgSolverType::AlternatingMaximization { restarts } => Box::new(
                AlternatingMaximization::new(restarts).keep_candidates(keep_candidates),
            ),
        }
    }
}

impl Default for BgSolverType {
    fn default() -> Self {
        BgSolverType::AlternatingMaximization { restarts: 10 }
    }
}

#[cfg(test)]
pub(crate) mod test_games {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Game with random probabilities and utilities
    pub fn random_game(nr_actions: Vec<usize>, nr_types: Vec<usize>, seed: u64) -> BayesianGameIdenticalPayoff {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut bg = BayesianGameIdenticalPayoff::new(nr_actions, nr_types).unwrap();
        let weights: Vec<f64> = (0..bg.nr_joint_types()).map(|_| rng.gen_range(0.0..1.0)).collect();
        let total: f64 = weights.iter().sum();
        for (jt, w) in weights.iter().enumerate() {
            bg.set_probability(jt, w / total).unwrap();
            for ja in 0..bg.nr_joint_actions() {
                bg.set_utility(jt, ja, rng.gen_range(-5.0..5.0)).unwrap();
            }
        }
        bg
    }
}
