#[cfg(test)]
mod property_tests {
    use ndarray::Array1;
    use perseus_bg::bayesian_game::solvers::{AlternatingMaximization, BgSolver, ExhaustiveSolver};
    use perseus_bg::bayesian_game::BayesianGameIdenticalPayoff;
    use perseus_bg::belief::{Belief, BeliefSet, JointBelief};
    use perseus_bg::model::{problems, DecPomdpModel};
    use perseus_bg::value_function::{AlphaVector, ValueFunction};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Strategy for probability vectors over `n` states
    fn belief_strategy(n: usize) -> impl Strategy<Value = Array1<f64>> {
        prop::collection::vec(0.01f64..1.0, n).prop_map(|v| {
            let total: f64 = v.iter().sum();
            Array1::from_vec(v.into_iter().map(|x| x / total).collect())
        })
    }

    // Strategy for games with two agents
    fn game_strategy() -> impl Strategy<Value = BayesianGameIdenticalPayoff> {
        (1usize..=3, 1usize..=3, 1usize..=3, 1usize..=3).prop_flat_map(|(a0, a1, t0, t1)| {
            let nr_jt = t0 * t1;
            let nr_ja = a0 * a1;
            (
                prop::collection::vec(0.01f64..1.0, nr_jt),
                prop::collection::vec(-10.0f64..10.0, nr_jt * nr_ja),
            )
                .prop_map(move |(weights, utilities)| {
                    let mut bg = BayesianGameIdenticalPayoff::new(vec![a0, a1], vec![t0, t1]).unwrap();
                    let total: f64 = weights.iter().sum();
                    for (jt, w) in weights.iter().enumerate() {
                        bg.set_probability(jt, w / total).unwrap();
                        for ja in 0..nr_ja {
                            bg.set_utility(jt, ja, utilities[jt * nr_ja + ja]).unwrap();
                        }
                    }
                    bg
                })
        })
    }

    proptest! {
        #[test]
        fn test_belief_update_stays_normalized(probs in belief_strategy(4), ja in 0usize..4, jo in 0usize..4) {
            let model = problems::random(4, vec![2, 2], vec![2, 2], 0.9, 3).unwrap();
            let belief = Belief::from_probabilities(probs);
            if let Some((next, p)) = belief.update(&model, ja, jo) {
                prop_assert!(p > 0.0 && p <= 1.0 + 1e-9);
                prop_assert!((next.to_dense().sum() - 1.0).abs() < 1e-9);
                prop_assert!(next.sanity_check(1e-9).is_ok());
            }
        }

        #[test]
        fn test_alternating_maximization_bounded_by_exhaustive(bg in game_strategy(), seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let optimal = ExhaustiveSolver::new().solve(&bg, &mut rng).unwrap();
            let local = AlternatingMaximization::new(2).solve(&bg, &mut rng).unwrap();
            prop_assert!(local.value <= optimal.value + 1e-9);
            prop_assert!((bg.expected_payoff(&optimal.policy) - optimal.value).abs() < 1e-9);
        }

        #[test]
        fn test_duplicate_suppression_is_idempotent(values in prop::collection::vec(-5.0f64..5.0, 3), action in 0usize..4) {
            let alpha = AlphaVector::from_values(Array1::from_vec(values), action);
            let mut vf = ValueFunction::new();
            prop_assert!(vf.insert_unique(alpha.clone()));
            let once = vf.clone();
            prop_assert!(!vf.insert_unique(alpha));
            prop_assert_eq!(vf, once);
        }

        #[test]
        fn test_value_function_text_round_trip(rows in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 3), 1..6)) {
            let vf = ValueFunction::from_vectors(
                rows.into_iter()
                    .enumerate()
                    .map(|(i, r)| AlphaVector::from_values(Array1::from_vec(r), i % 3))
                    .collect(),
            );
            prop_assert_eq!(ValueFunction::from_text(&vf.to_text(), 3).unwrap(), vf);
        }

        #[test]
        fn test_belief_set_text_round_trip(probs in prop::collection::vec(belief_strategy(3), 1..5)) {
            let set = BeliefSet::from_beliefs(probs.into_iter().map(Belief::from_probabilities).collect()).unwrap();
            prop_assert_eq!(BeliefSet::from_text(&set.to_text(), 3).unwrap(), set);
        }

        #[test]
        fn test_initial_belief_matches_model(seed in 0u64..50) {
            let model = problems::random(3, vec![2], vec![2], 0.5, seed).unwrap();
            prop_assert!(model.initial_belief().sanity_check(1e-9).is_ok());
        }
    }
}
