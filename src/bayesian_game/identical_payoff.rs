use super::tables::{ProbabilityTable, UtilityTable};
use super::JointPolicy;
use crate::error::{PlannerError, Result};
use crate::indexing;

/// Joint-type counts above this switch the game to sparse tables
pub const SPARSE_JOINT_TYPE_THRESHOLD: usize = 1_000_000;

/// Deviations of the probability sum above this are logged even when they
/// stay within the tolerance
const PROBABILITY_SUM_WARNING: f64 = 1e-12;

/// A joint type with non-zero probability
#[derive(Clone, Debug, PartialEq)]
pub struct JointTypeEntry {
    pub joint_type: usize,
    pub types: Vec<usize>,
    pub probability: f64,
}

/// One-shot cooperative Bayesian game with a single shared payoff
#[derive(Clone, Debug)]
pub struct BayesianGameIdenticalPayoff {
    nr_actions: Vec<usize>,
    nr_types: Vec<usize>,
    action_steps: Vec<usize>,
    type_steps: Vec<usize>,
    nr_joint_actions: usize,
    nr_joint_types: usize,
    probabilities: ProbabilityTable,
    utilities: UtilityTable,
}

impl BayesianGameIdenticalPayoff {
    pub fn new(nr_actions: Vec<usize>, nr_types: Vec<usize>) -> Result<Self> {
        Self::with_sparse_threshold(nr_actions, nr_types, SPARSE_JOINT_TYPE_THRESHOLD)
    }

    /// Like [`BayesianGameIdenticalPayoff::new`], with sparse tables whenever
    /// the number of joint types exceeds `threshold`.
    pub fn with_sparse_threshold(nr_actions: Vec<usize>, nr_types: Vec<usize>, threshold: usize) -> Result<Self> {
        if nr_actions.len() != nr_types.len() {
            return Err(PlannerError::dimension_mismatch(
                format!("{} type counts (one per agent)", nr_actions.len()),
                format!("{}", nr_types.len()),
            ));
        }
        if nr_actions.is_empty() {
            return Err(PlannerError::invalid_parameter("nr_agents", "a game needs at least one agent"));
        }
        if nr_actions.iter().chain(&nr_types).any(|&n| n == 0) {
            return Err(PlannerError::invalid_parameter(
                "nr_actions/nr_types".to_string(),
                format!("every count must be positive ({:?}, {:?})", nr_actions, nr_types),
            ));
        }
        let nr_joint_actions = indexing::checked_product(&nr_actions, "joint actions")?;
        let nr_joint_types = indexing::checked_product(&nr_types, "joint types")?;
        let sparse = nr_joint_types > threshold;
        Ok(BayesianGameIdenticalPayoff {
            action_steps: indexing::step_sizes(&nr_actions)?,
            type_steps: indexing::step_sizes(&nr_types)?,
            nr_actions,
            nr_types,
            nr_joint_actions,
            nr_joint_types,
            probabilities: ProbabilityTable::new(nr_joint_types, sparse),
            utilities: UtilityTable::new(nr_joint_types, nr_joint_actions, sparse),
        })
    }

    pub fn nr_agents(&self) -> usize {
        self.nr_actions.len()
    }

    pub fn nr_actions(&self) -> &[usize] {
        &self.nr_actions
    }

    pub fn nr_types(&self) -> &[usize] {
        &self.nr_types
    }

    pub fn nr_joint_actions(&self) -> usize {
        self.nr_joint_actions
    }

    pub fn nr_joint_types(&self) -> usize {
        self.nr_joint_types
    }

    pub fn action_steps(&self) -> &[usize] {
        &self.action_steps
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.probabilities, ProbabilityTable::Sparse(_))
    }

    pub fn individual_to_joint_types(&self, types: &[usize]) -> Result<usize> {
        indexing::check_individual(types, &self.nr_types, "type")?;
        Ok(indexing::individual_to_joint(types, &self.type_steps))
    }

    pub fn joint_to_individual_types(&self, jt: usize) -> Vec<usize> {
        indexing::joint_to_individual(jt, &self.type_steps)
    }

    pub fn individual_to_joint_action(&self, actions: &[usize]) -> Result<usize> {
        indexing::check_individual(actions, &self.nr_actions, "action")?;
        Ok(indexing::individual_to_joint(actions, &self.action_steps))
    }

    pub fn joint_to_individual_actions(&self, ja: usize) -> Vec<usize> {
        indexing::joint_to_individual(ja, &self.action_steps)
    }

    fn check_joint_type(&self, jt: usize) -> Result<()> {
        if jt >= self.nr_joint_types {
            return Err(PlannerError::dimension_mismatch(
                format!("joint type < {}", self.nr_joint_types),
                format!("{}", jt),
            ));
        }
        Ok(())
    }

    fn check_joint_action(&self, ja: usize) -> Result<()> {
        if ja >= self.nr_joint_actions {
            return Err(PlannerError::dimension_mismatch(
                format!("joint action < {}", self.nr_joint_actions),
                format!("{}", ja),
            ));
        }
        Ok(())
    }

    pub fn set_probability(&mut self, jt: usize, p: f64) -> Result<()> {
        self.check_joint_type(jt)?;
        self.probabilities.set(jt, p);
        Ok(())
    }

    pub fn probability(&self, jt: usize) -> Result<f64> {
        self.check_joint_type(jt)?;
        Ok(self.probabilities.get(jt))
    }

    pub fn set_probability_types(&mut self, types: &[usize], p: f64) -> Result<()> {
        let jt = self.individual_to_joint_types(types)?;
        self.probabilities.set(jt, p);
        Ok(())
    }

    pub fn probability_types(&self, types: &[usize]) -> Result<f64> {
        Ok(self.probabilities.get(self.individual_to_joint_types(types)?))
    }

    pub fn set_utility(&mut self, jt: usize, ja: usize, u: f64) -> Result<()> {
        self.check_joint_type(jt)?;
        self.check_joint_action(ja)?;
        self.utilities.set(jt, ja, u);
        Ok(())
    }

    pub fn utility(&self, jt: usize, ja: usize) -> Result<f64> {
        self.check_joint_type(jt)?;
        self.check_joint_action(ja)?;
        Ok(self.utilities.get(jt, ja))
    }

    /// Unchecked lookup for solver inner loops; indices must be in range
    pub(crate) fn utility_unchecked(&self, jt: usize, ja: usize) -> f64 {
        self.utilities.get(jt, ja)
    }

    /// Fail when the joint-type probabilities do not sum to one within
    /// `tolerance`.
    pub fn sanity_check(&self, tolerance: f64) -> Result<()> {
        let sum = self.probabilities.sum();
        let deviation = (sum - 1.0).abs();
        if deviation > tolerance {
            return Err(PlannerError::inconsistent("joint type probabilities", sum, tolerance));
        }
        if deviation > PROBABILITY_SUM_WARNING {
            log::warn!("joint type probabilities sum to {:.17} (deviation {:e})", sum, deviation);
        }
        Ok(())
    }

    /// Joint types with non-zero probability, ascending
    pub fn support(&self) -> Vec<JointTypeEntry> {
        self.probabilities
            .nonzeros()
            .into_iter()
            .map(|(jt, p)| JointTypeEntry {
                joint_type: jt,
                types: self.joint_to_individual_types(jt),
                probability: p,
            })
            .collect()
    }

    /// `Σ_jt P(jt)·U(jt, δ(jt))`
    pub fn expected_payoff(&self, policy: &JointPolicy) -> f64 {
        self.expected_payoff_over(&self.support(), policy)
    }

    /// [`Self::expected_payoff`] over a precomputed support
    pub fn expected_payoff_over(&self, support: &[JointTypeEntry], policy: &JointPolicy) -> f64 {
        support
            .iter()
            .map(|e| e.probability * self.utility_unchecked(e.joint_type, policy.joint_action(&e.types, &self.action_steps)))
            .sum()
    }
}
