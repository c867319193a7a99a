//! Back-projected alpha vectors.
//!
//! For a frozen set of Q-functions, `g_{a,o}^k(s) = Σ_{s'} T(s,a,s')·O(a,s',o)·α_k(s')`
//! for every joint action `a`, joint observation `o` and vector `k`. The
//! vectors are indexed in the flattened order of
//! [`QFunctions::to_value_function`], so the vectors of next action `a'` are a
//! contiguous range.

use std::ops::Range;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::{PlannerError, Result};
use crate::model::DecPomdpModel;
use crate::value_function::QFunctions;

/// Cache of back-projected vectors for one iteration
#[derive(Clone, Debug)]
pub struct Gao {
    /// `[a][o]` → `[k, s]`
    vectors: Vec<Vec<Array2<f64>>>,
    /// `[a]` → `[o, s]`, `Σ_{s'} T(s,a,s')·O(a,s',o)`
    observation_weights: Vec<Array2<f64>>,
    /// Vector range of every next joint action
    ranges: Vec<Range<usize>>,
}

impl Gao {
    /// Compute the cache for `q`.
    ///
    /// Fails if some joint action has no vectors, since its Q-value would be
    /// undefined.
    pub fn new<M: DecPomdpModel + ?Sized>(model: &M, q: &QFunctions) -> Result<Self> {
        let nr_s = model.nr_states();
        if q.nr_states() != nr_s || q.nr_joint_actions() != model.nr_joint_actions() {
            return Err(PlannerError::dimension_mismatch(
                format!("Q-functions over {} states and {} joint actions", nr_s, model.nr_joint_actions()),
                format!("{} states and {} joint actions", q.nr_states(), q.nr_joint_actions()),
            ));
        }

        let mut ranges = Vec::with_capacity(q.nr_joint_actions());
        let mut start = 0;
        for a in 0..q.nr_joint_actions() {
            let n = q.action(a).len();
            if n == 0 {
                return Err(PlannerError::invalid_parameter(
                    "q_functions".to_string(),
                    format!("joint action {} has no alpha vectors", a),
                ));
            }
            ranges.push(start..start + n);
            start += n;
        }

        let flat = q.to_value_function();
        // [k, s']
        let alphas = Array2::from_shape_fn((flat.len(), nr_s), |(k, s)| flat.vectors()[k].get(s));
        let nr_jo = model.nr_joint_observations();

        let (vectors, observation_weights): (Vec<_>, Vec<_>) = (0..model.nr_joint_actions())
            .into_par_iter()
            .map(|a| {
                let transitions = model.transition_matrix(a);
                let observations = model.observation_matrix(a);
                let per_observation: Vec<Array2<f64>> = (0..nr_jo)
                    .map(|o| {
                        // M[s, s'] = T(s,a,s')·O(a,s',o)
                        let m = &transitions * &observations.column(o).insert_axis(Axis(0));
                        alphas.dot(&m.t())
                    })
                    .collect();
                // [o, s] = (T · O)ᵀ
                let weights = transitions.dot(&observations).reversed_axes();
                (per_observation, weights)
            })
            .unzip();

        Ok(Gao {
            vectors,
            observation_weights,
            ranges,
        })
    }

    /// All back-projected vectors for `(a, o)` as rows of a `[k, s]` matrix
    pub fn vectors(&self, a: usize, o: usize) -> ArrayView2<'_, f64> {
        self.vectors[a][o].view()
    }

    pub fn vector(&self, a: usize, o: usize, k: usize) -> ArrayView1<'_, f64> {
        self.vectors[a][o].row(k)
    }

    /// `[o, s]` matrix whose rows give `P(o | b, a)` when projected on `b`
    pub fn observation_weights(&self, a: usize) -> ArrayView2<'_, f64> {
        self.observation_weights[a].view()
    }

    /// Indices of the vectors belonging to next joint action `a_next`
    pub fn range(&self, a_next: usize) -> Range<usize> {
        self.ranges[a_next].clone()
    }

    pub fn nr_vectors(&self) -> usize {
        self.ranges.last().map_or(0, |r| r.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::problems;
    use crate::value_function::{AlphaVector, ValueFunction};
    use ndarray::array;

    #[test]
    fn test_back_projection_matches_definition() {
        let model = problems::random(3, vec![2, 2], vec![2, 1], 0.9, 2).unwrap();
        let vf = ValueFunction::from_vectors(
            (0..4)
                .map(|a| AlphaVector::from_values(array![1.0 + a as f64, -2.0, 0.5], a))
                .collect(),
        );
        let q = QFunctions::from_value_function(vf.clone(), 3, 4).unwrap();
        let gao = Gao::new(&model, &q).unwrap();
        assert_eq!(gao.nr_vectors(), 4);
        assert_eq!(gao.range(2), 2..3);

        for a in 0..4 {
            for o in 0..model.nr_joint_observations() {
                for k in 0..4 {
                    for s in 0..3 {
                        let expected: f64 = (0..3)
                            .map(|s_next| {
                                model.transition_probability(s, a, s_next)
                                    * model.observation_probability(a, s_next, o)
                                    * vf.vectors()[k].get(s_next)
                            })
                            .sum();
                        assert!((gao.vector(a, o, k)[s] - expected).abs() < 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_observation_weights_sum_to_one() {
        let model = problems::dec_tiger().unwrap();
        let q = QFunctions::zero(2, 9);
        let gao = Gao::new(&model, &q).unwrap();
        for a in 0..9 {
            let totals = gao.observation_weights(a).sum_axis(Axis(0));
            assert!(totals.iter().all(|&t| (t - 1.0).abs() < 1e-9));
        }
    }

    #[test]
    fn test_empty_action_is_rejected() {
        let model = problems::state_matching(1.0).unwrap();
        let q = QFunctions::new(2, 4);
        assert!(Gao::new(&model, &q).is_err());
    }
}
