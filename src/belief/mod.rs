//! # Joint Beliefs
//!
//! A joint belief is a probability distribution over the states of a
//! Dec-POMDP. It is the sufficient statistic the centralized planner reasons
//! about; it only ever changes through the Bayes filter
//! `b'(s') ∝ Σ_s b(s) T(s,a,s') O(a,s',o)`.
//!
//! ## Core Concepts
//!
//! - **Dense belief**: one probability per state
//! - **Sparse belief**: only the states with non-zero probability
//! - **Belief set**: the fixed sample of beliefs Perseus backs up
//!
//! Both representations implement [`JointBelief`]; [`Belief`] picks one based
//! on the number of states so callers never branch on the representation.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::DecPomdpModel;

pub mod belief_set;
pub mod dense;
pub mod sparse;

pub use belief_set::{BeliefSampler, BeliefSet, SamplingPolicy};
pub use dense::DenseBelief;
pub use sparse::SparseBelief;

/// Observation branches with less probability mass than this are skipped
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Beliefs over more states than this are stored sparsely
pub const SPARSE_BELIEF_THRESHOLD: usize = 1000;

/// Core trait for joint belief representations
pub trait JointBelief: Clone + Send + Sync {
    fn nr_states(&self) -> usize;

    /// Probability of state `s`
    fn get(&self, s: usize) -> f64;

    /// `Σ_s b(s)·v(s)`
    fn inner_product(&self, values: ArrayView1<f64>) -> f64;

    /// `rows · b`, one inner product per row of `rows` (`[k, s]`)
    fn project(&self, rows: ArrayView2<f64>) -> Array1<f64>;

    /// Bayes update after joint action `ja` and joint observation `jo`.
    ///
    /// Returns the updated belief together with `P(jo | b, ja)`, or `None`
    /// when that probability is below [`PROBABILITY_EPSILON`].
    fn update<M: DecPomdpModel + ?Sized>(&self, model: &M, ja: usize, jo: usize) -> Option<(Self, f64)>;

    /// Draw a state from the belief
    fn sample_state<R: Rng + ?Sized>(&self, rng: &mut R) -> usize;

    /// Non-negative entries that sum to one within `tolerance`
    fn sanity_check(&self, tolerance: f64) -> Result<()>;

    fn to_dense(&self) -> Array1<f64>;
}

/// Joint belief with the representation chosen by problem size
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Belief {
    Dense(DenseBelief),
    Sparse(SparseBelief),
}

impl Belief {
    /// Wrap a probability vector, stored sparsely above
    /// [`SPARSE_BELIEF_THRESHOLD`] states.
    pub fn from_probabilities(probs: Array1<f64>) -> Self {
        if probs.len() > SPARSE_BELIEF_THRESHOLD {
            Belief::Sparse(SparseBelief::from_dense(probs.view()))
        } else {
            Belief::Dense(DenseBelief::new(probs))
        }
    }

    /// Uniform distribution over `nr_states` states
    pub fn uniform(nr_states: usize) -> Self {
        Self::from_probabilities(Array1::from_elem(nr_states, 1.0 / nr_states as f64))
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Belief::Sparse(_))
    }
}

impl JointBelief for Belief {
    fn nr_states(&self) -> usize {
        match self {
            Belief::Dense(b) => b.nr_states(),
            Belief::Sparse(b) => b.nr_states(),
        }
    }

    fn get(&self, s: usize) -> f64 {
        match self {
            Belief::Dense(b) => b.get(s),
            Belief::Sparse(b) => b.get(s),
        }
    }

    fn inner_product(&self, values: ArrayView1<f64>) -> f64 {
        match self {
            Belief::Dense(b) => b.inner_product(values),
            Belief::Sparse(b) => b.inner_product(values),
        }
    }

    fn project(&self, rows: ArrayView2<f64>) -> Array1<f64> {
        match self {
            Belief::Dense(b) => b.project(rows),
            Belief::Sparse(b) => b.project(rows),
        }
    }

    fn update<M: DecPomdpModel + ?Sized>(&self, model: &M, ja: usize, jo: usize) -> Option<(Self, f64)> {
        match self {
            Belief::Dense(b) => b.update(model, ja, jo).map(|(b, p)| (Belief::Dense(b), p)),
            Belief::Sparse(b) => b.update(model, ja, jo).map(|(b, p)| (Belief::Sparse(b), p)),
        }
    }

    fn sample_state<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Belief::Dense(b) => b.sample_state(rng),
            Belief::Sparse(b) => b.sample_state(rng),
        }
    }

    fn sanity_check(&self, tolerance: f64) -> Result<()> {
        match self {
            Belief::Dense(b) => b.sanity_check(tolerance),
            Belief::Sparse(b) => b.sanity_check(tolerance),
        }
    }

    fn to_dense(&self) -> Array1<f64> {
        match self {
            Belief::Dense(b) => b.to_dense(),
            Belief::Sparse(b) => b.to_dense(),
        }
    }
}

/// Draw an index from `(index, probability)` pairs with a single uniform draw.
pub(crate) fn sample_index<R, I>(entries: I, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
    I: Iterator<Item = (usize, f64)>,
{
    let u: f64 = rng.gen();
    let mut cumulative = 0.0;
    let mut last = 0;
    for (i, p) in entries {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last = i;
        if u < cumulative {
            return i;
        }
    }
    // rounding can leave the total slightly below one
    last
}
