//! # Discrete Dec-POMDP Models
//!
//! The planner only ever talks to a model through the [`DecPomdpModel`] trait:
//! sizes of the state, joint action and joint observation spaces, the
//! transition / observation / reward lookups, the discount and the initial
//! state distribution.
//!
//! ## Available Components
//!
//! - `DecPomdpModel` trait: capability interface consumed by the planner
//! - `DecPomdp`: dense tabular model built with `DecPomdpBuilder`
//! - `problems`: standard benchmark problems and a seeded random generator
//! - `sampling`: drawing states and observations for rollouts and simulation

use ndarray::{Array1, Array2};

use crate::belief::Belief;

pub mod discrete;
pub mod problems;
pub mod sampling;

pub use discrete::{DecPomdp, DecPomdpBuilder};

/// Capability interface of a discrete Dec-POMDP
pub trait DecPomdpModel: Send + Sync {
    /// Number of states
    fn nr_states(&self) -> usize;

    /// Number of actions of every agent
    fn nr_actions(&self) -> &[usize];

    /// Number of observations of every agent
    fn nr_observations(&self) -> &[usize];

    fn nr_joint_actions(&self) -> usize;

    fn nr_joint_observations(&self) -> usize;

    /// `T(s, ja, s')`
    fn transition_probability(&self, s: usize, ja: usize, s_next: usize) -> f64;

    /// `O(ja, s', jo)`
    fn observation_probability(&self, ja: usize, s_next: usize, jo: usize) -> f64;

    /// `R(s, ja)`
    fn reward(&self, s: usize, ja: usize) -> f64;

    fn discount(&self) -> f64;

    /// Probability of `s` under the initial state distribution
    fn initial_state_probability(&self, s: usize) -> f64;

    fn joint_to_individual_actions(&self, ja: usize) -> Vec<usize>;

    fn individual_to_joint_action(&self, actions: &[usize]) -> usize;

    fn joint_to_individual_observations(&self, jo: usize) -> Vec<usize>;

    fn individual_to_joint_observation(&self, observations: &[usize]) -> usize;

    fn nr_agents(&self) -> usize {
        self.nr_actions().len()
    }

    /// Fresh joint belief from the initial state distribution
    fn initial_belief(&self) -> Belief {
        let probs = Array1::from_iter(
            (0..self.nr_states()).map(|s| self.initial_state_probability(s)),
        );
        Belief::from_probabilities(probs)
    }

    /// `T(·, ja, ·)` as an `[s, s']` matrix
    fn transition_matrix(&self, ja: usize) -> Array2<f64> {
        let n = self.nr_states();
        Array2::from_shape_fn((n, n), |(s, s_next)| self.transition_probability(s, ja, s_next))
    }

    /// `O(ja, ·, ·)` as an `[s', jo]` matrix
    fn observation_matrix(&self, ja: usize) -> Array2<f64> {
        Array2::from_shape_fn((self.nr_states(), self.nr_joint_observations()), |(s_next, jo)| {
            self.observation_probability(ja, s_next, jo)
        })
    }

    /// `R(·, ja)` as a vector over states
    fn reward_vector(&self, ja: usize) -> Array1<f64> {
        Array1::from_iter((0..self.nr_states()).map(|s| self.reward(s, ja)))
    }
}
