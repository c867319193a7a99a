use ndarray::Array2;
use rand::RngCore;

use super::{BgSolution, BgSolver, IMPROVEMENT_EPSILON};
use crate::bayesian_game::{BayesianGameIdenticalPayoff, JointPolicy, JointTypeEntry};
use crate::error::{PlannerError, Result};

const DEFAULT_MAX_SWEEPS: usize = 1000;

/// Alternating maximization: coordinate ascent over agents.
///
/// From a random joint policy every agent in turn best-responds to the
/// others, type by type, until a full sweep changes nothing. The search is
/// restarted `restarts` times and the best local optimum is returned.
#[derive(Clone, Debug)]
pub struct AlternatingMaximization {
    restarts: usize,
    max_sweeps: usize,
    keep_candidates: bool,
}

impl AlternatingMaximization {
    pub fn new(restarts: usize) -> Self {
        AlternatingMaximization {
            restarts: restarts.max(1),
            max_sweeps: DEFAULT_MAX_SWEEPS,
            keep_candidates: false,
        }
    }

    /// Record the local optimum of every restart
    pub fn keep_candidates(mut self, keep: bool) -> Self {
        self.keep_candidates = keep;
        self
    }

    /// Bound on the agent sweeps of a single restart
    pub fn max_sweeps(mut self, sweeps: usize) -> Self {
        self.max_sweeps = sweeps.max(1);
        self
    }

    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Solve with the first restart seeded from `start` instead of a random
    /// policy.
    pub fn solve_from(
        &self,
        bg: &BayesianGameIdenticalPayoff,
        start: Option<&JointPolicy>,
        rng: &mut dyn RngCore,
    ) -> Result<BgSolution> {
        if let Some(start) = start {
            check_policy(bg, start)?;
        }
        let support = bg.support();

        let mut best: Option<(JointPolicy, f64)> = None;
        let mut candidates = Vec::new();
        for restart in 0..self.restarts {
            let initial = match (restart, start) {
                (0, Some(policy)) => policy.clone(),
                _ => JointPolicy::random(bg.nr_types(), bg.nr_actions(), rng),
            };
            let (policy, value) = self.climb(bg, &support, initial);
            log::trace!("alternating maximization restart {} reached {}", restart, value);
            if best.as_ref().map_or(true, |(_, v)| value > *v) {
                best = Some((policy.clone(), value));
            }
            if self.keep_candidates {
                candidates.push((policy, value));
            }
        }

        // restarts >= 1, so a solution always exists
        let (policy, value) = best.unwrap_or_else(|| {
            let policy = JointPolicy::zeros(bg.nr_types());
            let value = bg.expected_payoff_over(&support, &policy);
            (policy, value)
        });
        Ok(BgSolution { value, policy, candidates })
    }

    fn climb(
        &self,
        bg: &BayesianGameIdenticalPayoff,
        support: &[JointTypeEntry],
        mut policy: JointPolicy,
    ) -> (JointPolicy, f64) {
        let steps = bg.action_steps();
        for _ in 0..self.max_sweeps {
            let mut changed = false;
            for agent in 0..bg.nr_agents() {
                let mut values = Array2::<f64>::zeros((bg.nr_types()[agent], bg.nr_actions()[agent]));
                for e in support {
                    let own_type = e.types[agent];
                    let base = policy.joint_action(&e.types, steps) - policy.action(agent, own_type) * steps[agent];
                    for a in 0..bg.nr_actions()[agent] {
                        values[[own_type, a]] += e.probability * bg.utility_unchecked(e.joint_type, base + a * steps[agent]);
                    }
                }
                for t in 0..bg.nr_types()[agent] {
                    let current = policy.action(agent, t);
                    let mut best = (current, values[[t, current]]);
                    for a in 0..bg.nr_actions()[agent] {
                        if values[[t, a]] > best.1 + IMPROVEMENT_EPSILON {
                            best = (a, values[[t, a]]);
                        }
                    }
                    if best.0 != current {
                        policy.set(agent, t, best.0);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        let value = bg.expected_payoff_over(support, &policy);
        (policy, value)
    }
}

fn check_policy(bg: &BayesianGameIdenticalPayoff, policy: &JointPolicy) -> Result<()> {
    if policy.nr_agents() != bg.nr_agents() {
        return Err(PlannerError::dimension_mismatch(
            format!("a policy for {} agents", bg.nr_agents()),
            format!("{} agents", policy.nr_agents()),
        ));
    }
    for agent in 0..bg.nr_agents() {
        let individual = policy.agent(agent);
        if individual.len() != bg.nr_types()[agent] || individual.iter().any(|&a| a >= bg.nr_actions()[agent]) {
            return Err(PlannerError::dimension_mismatch(
                format!(
                    "{} actions below {} for agent {}",
                    bg.nr_types()[agent],
                    bg.nr_actions()[agent],
                    agent
                ),
                format!("{:?}", individual),
            ));
        }
    }
    Ok(())
}

impl BgSolver for AlternatingMaximization {
    fn solve(&self, bg: &BayesianGameIdenticalPayoff, rng: &mut dyn RngCore) -> Result<BgSolution> {
        self.solve_from(bg, None, rng)
    }

    fn name(&self) -> &'static str {
        "alternating-maximization"
    }
}
