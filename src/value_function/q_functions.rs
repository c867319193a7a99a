use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AlphaVector, ValueFunction};
use crate::belief::JointBelief;
use crate::error::{PlannerError, Result};
use crate::model::DecPomdpModel;

/// One value function per joint action: `Q(b, a) = max_{α ∈ Q[a]} b·α`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QFunctions {
    nr_states: usize,
    per_action: Vec<ValueFunction>,
}

impl QFunctions {
    /// Empty sets for every joint action
    pub fn new(nr_states: usize, nr_joint_actions: usize) -> Self {
        QFunctions {
            nr_states,
            per_action: vec![ValueFunction::new(); nr_joint_actions],
        }
    }

    /// A single all-zero vector per joint action
    pub fn zero(nr_states: usize, nr_joint_actions: usize) -> Self {
        QFunctions {
            nr_states,
            per_action: (0..nr_joint_actions)
                .map(|a| ValueFunction::from_vectors(vec![AlphaVector::new(nr_states, a)]))
                .collect(),
        }
    }

    /// The immediate reward vector `R(·, a)` for every joint action
    pub fn immediate_reward<M: DecPomdpModel + ?Sized>(model: &M) -> Self {
        QFunctions {
            nr_states: model.nr_states(),
            per_action: (0..model.nr_joint_actions())
                .map(|a| {
                    ValueFunction::from_vectors(vec![AlphaVector::from_values(model.reward_vector(a), a)])
                })
                .collect(),
        }
    }

    /// Group a flat value function by the action tags of its vectors
    pub fn from_value_function(vf: ValueFunction, nr_states: usize, nr_joint_actions: usize) -> Result<Self> {
        vf.check_dimension(nr_states)?;
        let mut q = QFunctions::new(nr_states, nr_joint_actions);
        for alpha in vf {
            if alpha.action() >= nr_joint_actions {
                return Err(PlannerError::dimension_mismatch(
                    format!("action index < {}", nr_joint_actions),
                    format!("{}", alpha.action()),
                ));
            }
            q.per_action[alpha.action()].push(alpha);
        }
        Ok(q)
    }

    /// All vectors in a single set, ordered by joint action
    pub fn to_value_function(&self) -> ValueFunction {
        ValueFunction::from_vectors(
            self.per_action
                .iter()
                .flat_map(|vf| vf.iter().cloned())
                .collect(),
        )
    }

    pub fn nr_states(&self) -> usize {
        self.nr_states
    }

    pub fn nr_joint_actions(&self) -> usize {
        self.per_action.len()
    }

    /// Total number of vectors over all joint actions
    pub fn nr_vectors(&self) -> usize {
        self.per_action.iter().map(ValueFunction::len).sum()
    }

    pub fn action(&self, a: usize) -> &ValueFunction {
        &self.per_action[a]
    }

    /// Insert into the set of the vector's action unless already present
    pub fn insert_unique(&mut self, alpha: AlphaVector) -> bool {
        let a = alpha.action();
        self.per_action[a].insert_unique(alpha)
    }

    pub fn q_value<B: JointBelief>(&self, belief: &B, a: usize) -> f64 {
        self.per_action[a].value(belief)
    }

    /// Greedy joint action and its value, lowest index on ties
    pub fn greedy_action<B: JointBelief>(&self, belief: &B) -> (usize, f64) {
        let mut best = (0, f64::NEG_INFINITY);
        for a in 0..self.per_action.len() {
            let q = self.q_value(belief, a);
            if q > best.1 {
                best = (a, q);
            }
        }
        best
    }

    pub fn value<B: JointBelief>(&self, belief: &B) -> f64 {
        self.greedy_action(belief).1
    }

    pub fn maximizing_vector<B: JointBelief>(&self, belief: &B, a: usize) -> Option<&AlphaVector> {
        self.per_action[a].maximizing_vector(belief)
    }

    /// Write all vectors in the text alpha-vector format
    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_value_function().save_text(path)
    }

    pub fn load_text<P: AsRef<Path>>(path: P, nr_states: usize, nr_joint_actions: usize) -> Result<Self> {
        Self::from_value_function(ValueFunction::load_text(path, nr_states)?, nr_states, nr_joint_actions)
    }

    /// Save in binary form
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load Q-functions saved with [`QFunctions::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}
