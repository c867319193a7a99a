use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{sample_index, JointBelief, PROBABILITY_EPSILON};
use crate::error::{PlannerError, Result};
use crate::model::discrete::check_distribution;
use crate::model::DecPomdpModel;

/// Belief storing only states with non-zero probability, sorted by state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseBelief {
    nr_states: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseBelief {
    pub fn from_dense(probs: ArrayView1<f64>) -> Self {
        SparseBelief {
            nr_states: probs.len(),
            entries: probs
                .iter()
                .enumerate()
                .filter(|(_, &p)| p != 0.0)
                .map(|(s, &p)| (s, p))
                .collect(),
        }
    }

    /// Build from `(state, probability)` pairs; states must be in range.
    pub fn from_entries(nr_states: usize, entries: Vec<(usize, f64)>) -> Result<Self> {
        let mut merged = BTreeMap::new();
        for (s, p) in entries {
            if s >= nr_states {
                return Err(PlannerError::dimension_mismatch(
                    format!("state index < {}", nr_states),
                    format!("{}", s),
                ));
            }
            if p != 0.0 {
                *merged.entry(s).or_insert(0.0) += p;
            }
        }
        Ok(SparseBelief {
            nr_states,
            entries: merged.into_iter().collect(),
        })
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn nr_nonzeros(&self) -> usize {
        self.entries.len()
    }
}

impl JointBelief for SparseBelief {
    fn nr_states(&self) -> usize {
        self.nr_states
    }

    fn get(&self, s: usize) -> f64 {
        match self.entries.binary_search_by_key(&s, |&(state, _)| state) {
            Ok(i) => self.entries[i].1,
            Err(_) => 0.0,
        }
    }

    fn inner_product(&self, values: ArrayView1<f64>) -> f64 {
        self.entries.iter().map(|&(s, p)| p * values[s]).sum()
    }

    fn project(&self, rows: ArrayView2<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(rows.nrows());
        for &(s, p) in &self.entries {
            out.scaled_add(p, &rows.column(s));
        }
        out
    }

    fn update<M: DecPomdpModel + ?Sized>(&self, model: &M, ja: usize, jo: usize) -> Option<(Self, f64)> {
        let mut next: BTreeMap<usize, f64> = BTreeMap::new();
        for &(s, p) in &self.entries {
            for s_next in 0..self.nr_states {
                let t = model.transition_probability(s, ja, s_next);
                if t == 0.0 {
                    continue;
                }
                let o = model.observation_probability(ja, s_next, jo);
                if o == 0.0 {
                    continue;
                }
                *next.entry(s_next).or_insert(0.0) += p * t * o;
            }
        }
        let mass: f64 = next.values().sum();
        if mass < PROBABILITY_EPSILON {
            return None;
        }
        let entries = next.into_iter().map(|(s, p)| (s, p / mass)).collect();
        Some((
            SparseBelief {
                nr_states: self.nr_states,
                entries,
            },
            mass,
        ))
    }

    fn sample_state<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        sample_index(self.entries.iter().copied(), rng)
    }

    fn sanity_check(&self, tolerance: f64) -> Result<()> {
        check_distribution(self.entries.iter().map(|(_, p)| p), "belief probabilities", tolerance)
    }

    fn to_dense(&self) -> Array1<f64> {
        let mut probs = Array1::zeros(self.nr_states);
        for &(s, p) in &self.entries {
            probs[s] = p;
        }
        probs
    }
}
