use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{sample_index, JointBelief, PROBABILITY_EPSILON};
use crate::error::Result;
use crate::model::discrete::check_distribution;
use crate::model::DecPomdpModel;

/// Belief storing one probability per state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseBelief {
    probs: Array1<f64>,
}

impl DenseBelief {
    pub fn new(probs: Array1<f64>) -> Self {
        DenseBelief { probs }
    }

    pub fn probabilities(&self) -> &Array1<f64> {
        &self.probs
    }
}

impl JointBelief for DenseBelief {
    fn nr_states(&self) -> usize {
        self.probs.len()
    }

    fn get(&self, s: usize) -> f64 {
        self.probs[s]
    }

    fn inner_product(&self, values: ArrayView1<f64>) -> f64 {
        self.probs.dot(&values)
    }

    fn project(&self, rows: ArrayView2<f64>) -> Array1<f64> {
        rows.dot(&self.probs)
    }

    fn update<M: DecPomdpModel + ?Sized>(&self, model: &M, ja: usize, jo: usize) -> Option<(Self, f64)> {
        let n = self.probs.len();
        let mut next = Array1::<f64>::zeros(n);
        for (s, &p) in self.probs.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for s_next in 0..n {
                next[s_next] += p * model.transition_probability(s, ja, s_next);
            }
        }
        for (s_next, value) in next.iter_mut().enumerate() {
            *value *= model.observation_probability(ja, s_next, jo);
        }
        let mass = next.sum();
        if mass < PROBABILITY_EPSILON {
            return None;
        }
        next /= mass;
        Some((DenseBelief { probs: next }, mass))
    }

    fn sample_state<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        sample_index(self.probs.iter().copied().enumerate(), rng)
    }

    fn sanity_check(&self, tolerance: f64) -> Result<()> {
        check_distribution(self.probs.iter(), "belief probabilities", tolerance)
    }

    fn to_dense(&self) -> Array1<f64> {
        self.probs.clone()
    }
}
