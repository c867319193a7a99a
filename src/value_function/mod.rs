//! # Piecewise-Linear Convex Value Functions
//!
//! A value function over joint beliefs is the upper envelope of a set of
//! alpha vectors: `V(b) = max_α b·α`. The planner keeps one such set per joint
//! action ([`QFunctions`]) so it can read off `Q(b, a)` directly.
//!
//! Sets only grow within a planning run and are de-duplicated by exact
//! element-wise equality.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::belief::JointBelief;
use crate::error::{PlannerError, Result};

pub mod io;
pub mod q_functions;

pub use q_functions::QFunctions;

/// Per-state values tagged with the joint action that achieves them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaVector {
    values: Array1<f64>,
    action: usize,
}

impl AlphaVector {
    /// All-zero vector over `nr_states` states
    pub fn new(nr_states: usize, action: usize) -> Self {
        AlphaVector {
            values: Array1::zeros(nr_states),
            action,
        }
    }

    pub fn from_values(values: Array1<f64>, action: usize) -> Self {
        AlphaVector { values, action }
    }

    pub fn nr_states(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, s: usize) -> f64 {
        self.values[s]
    }

    pub fn set(&mut self, s: usize, v: f64) {
        self.values[s] = v;
    }

    pub fn action(&self) -> usize {
        self.action
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// `Σ_s b(s)·α(s)`
    pub fn inner_product<B: JointBelief>(&self, belief: &B) -> f64 {
        belief.inner_product(self.values.view())
    }
}

/// Unordered set of alpha vectors
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueFunction {
    vectors: Vec<AlphaVector>,
}

impl ValueFunction {
    pub fn new() -> Self {
        ValueFunction { vectors: Vec::new() }
    }

    pub fn from_vectors(vectors: Vec<AlphaVector>) -> Self {
        ValueFunction { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[AlphaVector] {
        &self.vectors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlphaVector> {
        self.vectors.iter()
    }

    /// Append without any duplicate check
    pub fn push(&mut self, alpha: AlphaVector) {
        self.vectors.push(alpha);
    }

    /// Whether an element-wise identical vector with the same action is present
    pub fn contains(&self, alpha: &AlphaVector) -> bool {
        self.vectors.iter().any(|v| v == alpha)
    }

    /// Insert unless already present; returns whether the set grew.
    pub fn insert_unique(&mut self, alpha: AlphaVector) -> bool {
        if self.contains(&alpha) {
            false
        } else {
            self.vectors.push(alpha);
            true
        }
    }

    /// `max_α b·α`, `-∞` for an empty set
    pub fn value<B: JointBelief>(&self, belief: &B) -> f64 {
        self.maximizing_index(belief)
            .map(|(_, v)| v)
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Index and value of the vector maximizing the value at `belief`,
    /// the first one on ties.
    pub fn maximizing_index<B: JointBelief>(&self, belief: &B) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, alpha) in self.vectors.iter().enumerate() {
            let v = alpha.inner_product(belief);
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((i, v));
            }
        }
        best
    }

    pub fn maximizing_vector<B: JointBelief>(&self, belief: &B) -> Option<&AlphaVector> {
        self.maximizing_index(belief).map(|(i, _)| &self.vectors[i])
    }

    /// Fail unless every vector ranges over `nr_states` states
    pub fn check_dimension(&self, nr_states: usize) -> Result<()> {
        match self.vectors.iter().find(|v| v.nr_states() != nr_states) {
            Some(v) => Err(PlannerError::dimension_mismatch(
                format!("alpha vectors over {} states", nr_states),
                format!("a vector over {} states", v.nr_states()),
            )),
            None => Ok(()),
        }
    }
}

impl IntoIterator for ValueFunction {
    type Item = AlphaVector;
    type IntoIter = std::vec::IntoIter<AlphaVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.vectors.into_iter()
    }
}
