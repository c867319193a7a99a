use rand::RngCore;

use super::{BgSolution, BgSolver};
use crate::bayesian_game::{BayesianGameIdenticalPayoff, JointPolicy};
use crate::error::{PlannerError, Result};
use crate::indexing;

/// Enumerates every pure joint policy.
///
/// There are `Π_i nrA_i^nrT_i` of them; the solver refuses games where that
/// count does not fit a `usize`.
#[derive(Clone, Debug, Default)]
pub struct ExhaustiveSolver {
    keep_candidates: bool,
}

impl ExhaustiveSolver {
    pub fn new() -> Self {
        ExhaustiveSolver { keep_candidates: false }
    }

    /// Record every enumerated policy with its value
    pub fn keep_candidates(mut self, keep: bool) -> Self {
        self.keep_candidates = keep;
        self
    }

    /// Number of pure joint policies of `bg`
    pub fn nr_policies(bg: &BayesianGameIdenticalPayoff) -> Result<usize> {
        let mut count = 1usize;
        for (&actions, &types) in bg.nr_actions().iter().zip(bg.nr_types()) {
            if actions == 1 {
                continue;
            }
            for _ in 0..types {
                count = count.checked_mul(actions).ok_or_else(|| {
                    PlannerError::Overflow(format!(
                        "number of joint policies overflows usize (actions {:?}, types {:?})",
                        bg.nr_actions(),
                        bg.nr_types()
                    ))
                })?;
            }
        }
        Ok(count)
    }
}

impl BgSolver for ExhaustiveSolver {
    fn solve(&self, bg: &BayesianGameIdenticalPayoff, _rng: &mut dyn RngCore) -> Result<BgSolution> {
        let nr_policies = Self::nr_policies(bg)?;
        log::trace!("enumerating {} joint policies", nr_policies);

        // one digit per (agent, type), agent 0 first
        let radices: Vec<usize> = bg
            .nr_actions()
            .iter()
            .zip(bg.nr_types())
            .flat_map(|(&a, &t)| std::iter::repeat(a).take(t))
            .collect();
        let offsets: Vec<usize> = bg
            .nr_types()
            .iter()
            .scan(0, |acc, &t| {
                let offset = *acc;
                *acc += t;
                Some(offset)
            })
            .collect();
        let support = bg.support();
        let steps = bg.action_steps();

        let to_policy = |digits: &[usize]| {
            JointPolicy::new(
                offsets
                    .iter()
                    .zip(bg.nr_types())
                    .map(|(&o, &t)| digits[o..o + t].to_vec())
                    .collect(),
            )
        };

        let mut digits = vec![0usize; radices.len()];
        let mut best_digits = digits.clone();
        let mut best_value = f64::NEG_INFINITY;
        let mut candidates = Vec::new();
        loop {
            let value: f64 = support
                .iter()
                .map(|e| {
                    let ja: usize = e
                        .types
                        .iter()
                        .enumerate()
                        .map(|(agent, &t)| digits[offsets[agent] + t] * steps[agent])
                        .sum();
                    e.probability * bg.utility_unchecked(e.joint_type, ja)
                })
                .sum();
            if value > best_value {
                best_value = value;
                best_digits.copy_from_slice(&digits);
            }
            if self.keep_candidates {
                candidates.push((to_policy(&digits), value));
            }
            if !indexing::increment(&mut digits, &radices) {
                break;
            }
        }

        Ok(BgSolution {
            value: best_value,
            policy: to_policy(&best_digits),
            candidates,
        })
    }

    fn name(&self) -> &'static str {
        "exhaustive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_coordination_on_types() {
        // both agents observe the same coin; they win by naming it together
        let mut bg = BayesianGameIdenticalPayoff::new(vec![2, 2], vec![2, 2]).unwrap();
        bg.set_probability_types(&[0, 0], 0.5).unwrap();
        bg.set_probability_types(&[1, 1], 0.5).unwrap();
        for t in 0..2 {
            let jt = bg.individual_to_joint_types(&[t, t]).unwrap();
            let ja = bg.individual_to_joint_action(&[t, t]).unwrap();
            bg.set_utility(jt, ja, 1.0).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(0);
        let solution = ExhaustiveSolver::new().solve(&bg, &mut rng).unwrap();
        assert!((solution.value - 1.0).abs() < 1e-12);
        assert_eq!(solution.policy.agent(0), &[0, 1]);
        assert_eq!(solution.policy.agent(1), &[0, 1]);
    }

    #[test]
    fn test_ties_keep_first_policy() {
        let mut bg = BayesianGameIdenticalPayoff::new(vec![3], vec![1]).unwrap();
        bg.set_probability(0, 1.0).unwrap();
        bg.set_utility(0, 1, 2.0).unwrap();
        bg.set_utility(0, 2, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let solution = ExhaustiveSolver::new().solve(&bg, &mut rng).unwrap();
        assert_eq!(solution.policy.action(0, 0), 1);
    }

    #[test]
    fn test_candidates_cover_every_policy() {
        let bg = super::super::test_games::random_game(vec![2, 2], vec![2, 1], 3);
        assert_eq!(ExhaustiveSolver::nr_policies(&bg).unwrap(), 8);
        let mut rng = StdRng::seed_from_u64(0);
        let solution = ExhaustiveSolver::new().keep_candidates(true).solve(&bg, &mut rng).unwrap();
        assert_eq!(solution.candidates.len(), 8);
        let best = solution
            .candidates
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best, solution.value);
    }

    #[test]
    fn test_policy_count_overflow() {
        let bg = BayesianGameIdenticalPayoff::new(vec![4, 4], vec![40, 1]).unwrap();
        assert!(matches!(ExhaustiveSolver::nr_policies(&bg), Err(PlannerError::Overflow(_))));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(ExhaustiveSolver::new().solve(&bg, &mut rng).is_err());
    }
}
