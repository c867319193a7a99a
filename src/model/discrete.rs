use ndarray::{s, Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use super::DecPomdpModel;
use crate::error::{PlannerError, Result};
use crate::indexing;

/// Default tolerance for probability rows summing to one
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Dense tabular Dec-POMDP
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecPomdp {
    name: String,
    nr_states: usize,
    nr_actions: Vec<usize>,
    nr_observations: Vec<usize>,
    action_steps: Vec<usize>,
    observation_steps: Vec<usize>,
    /// `[s, ja, s']`
    transitions: Array3<f64>,
    /// `[ja, s', jo]`
    observations: Array3<f64>,
    /// `[s, ja]`
    rewards: Array2<f64>,
    isd: Array1<f64>,
    discount: f64,
}

impl DecPomdp {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &Array3<f64> {
        &self.transitions
    }

    pub fn observations(&self) -> &Array3<f64> {
        &self.observations
    }

    pub fn rewards(&self) -> &Array2<f64> {
        &self.rewards
    }

    pub fn initial_state_distribution(&self) -> &Array1<f64> {
        &self.isd
    }

    /// Copy of this model with a different discount factor
    pub fn with_discount(&self, discount: f64) -> Result<Self> {
        check_discount(discount)?;
        let mut model = self.clone();
        model.discount = discount;
        Ok(model)
    }
}

impl DecPomdpModel for DecPomdp {
    fn nr_states(&self) -> usize {
        self.nr_states
    }

    fn nr_actions(&self) -> &[usize] {
        &self.nr_actions
    }

    fn nr_observations(&self) -> &[usize] {
        &self.nr_observations
    }

    fn nr_joint_actions(&self) -> usize {
        self.rewards.ncols()
    }

    fn nr_joint_observations(&self) -> usize {
        self.observations.len_of(Axis(2))
    }

    fn transition_probability(&self, s: usize, ja: usize, s_next: usize) -> f64 {
        self.transitions[[s, ja, s_next]]
    }

    fn observation_probability(&self, ja: usize, s_next: usize, jo: usize) -> f64 {
        self.observations[[ja, s_next, jo]]
    }

    fn reward(&self, s: usize, ja: usize) -> f64 {
        self.rewards[[s, ja]]
    }

    fn discount(&self) -> f64 {
        self.discount
    }

    fn initial_state_probability(&self, s: usize) -> f64 {
        self.isd[s]
    }

    fn joint_to_individual_actions(&self, ja: usize) -> Vec<usize> {
        indexing::joint_to_individual(ja, &self.action_steps)
    }

    fn individual_to_joint_action(&self, actions: &[usize]) -> usize {
        indexing::individual_to_joint(actions, &self.action_steps)
    }

    fn joint_to_individual_observations(&self, jo: usize) -> Vec<usize> {
        indexing::joint_to_individual(jo, &self.observation_steps)
    }

    fn individual_to_joint_observation(&self, observations: &[usize]) -> usize {
        indexing::individual_to_joint(observations, &self.observation_steps)
    }

    fn transition_matrix(&self, ja: usize) -> Array2<f64> {
        self.transitions.slice(s![.., ja, ..]).to_owned()
    }

    fn observation_matrix(&self, ja: usize) -> Array2<f64> {
        self.observations.index_axis(Axis(0), ja).to_owned()
    }

    fn reward_vector(&self, ja: usize) -> Array1<f64> {
        self.rewards.column(ja).to_owned()
    }
}

fn check_discount(discount: f64) -> Result<()> {
    if !(discount > 0.0 && discount <= 1.0) {
        return Err(PlannerError::invalid_parameter(
            "discount".to_string(),
            format!("must be in (0, 1], got {}", discount),
        ));
    }
    Ok(())
}

/// Builder for [`DecPomdp`]
///
/// Entries are set one at a time or as whole tables; every problem found along
/// the way is reported by [`DecPomdpBuilder::build`].
pub struct DecPomdpBuilder {
    name: String,
    nr_states: usize,
    nr_actions: Vec<usize>,
    nr_observations: Vec<usize>,
    nr_joint_actions: usize,
    nr_joint_observations: usize,
    transitions: Array3<f64>,
    observations: Array3<f64>,
    rewards: Array2<f64>,
    isd: Option<Array1<f64>>,
    discount: f64,
    tolerance: f64,
    error: Option<PlannerError>,
}

impl DecPomdpBuilder {
    /// Create a builder with all-zero tables and a uniform initial state
    /// distribution.
    pub fn new(nr_states: usize, nr_actions: Vec<usize>, nr_observations: Vec<usize>) -> Self {
        let mut error = None;
        if nr_actions.len() != nr_observations.len() || nr_actions.is_empty() {
            error = Some(PlannerError::dimension_mismatch(
                format!("{} observation counts (one per agent)", nr_actions.len()),
                format!("{}", nr_observations.len()),
            ));
        }
        let nr_ja = indexing::checked_product(&nr_actions, "joint actions");
        let nr_jo = indexing::checked_product(&nr_observations, "joint observations");
        let (nr_ja, nr_jo) = match (nr_ja, nr_jo) {
            (Ok(a), Ok(o)) => (a, o),
            (Err(e), _) | (_, Err(e)) => {
                error.get_or_insert(e);
                (0, 0)
            }
        };
        DecPomdpBuilder {
            name: "unnamed".to_string(),
            nr_states,
            nr_actions,
            nr_observations,
            nr_joint_actions: nr_ja,
            nr_joint_observations: nr_jo,
            transitions: Array3::zeros((nr_states, nr_ja, nr_states)),
            observations: Array3::zeros((nr_ja, nr_states, nr_jo)),
            rewards: Array2::zeros((nr_states, nr_ja)),
            isd: None,
            discount: 1.0,
            tolerance: DEFAULT_TOLERANCE,
            error,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Tolerance used when checking that probability rows sum to one
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn nr_joint_actions(&self) -> usize {
        self.nr_joint_actions
    }

    pub fn nr_joint_observations(&self) -> usize {
        self.nr_joint_observations
    }

    /// Joint action index of the individual actions, agent 0 most significant
    pub fn joint_action(&self, actions: &[usize]) -> Result<usize> {
        indexing::check_individual(actions, &self.nr_actions, "action")?;
        Ok(indexing::individual_to_joint(actions, &indexing::step_sizes(&self.nr_actions)?))
    }

    /// Joint observation index of the individual observations
    pub fn joint_observation(&self, observations: &[usize]) -> Result<usize> {
        indexing::check_individual(observations, &self.nr_observations, "observation")?;
        Ok(indexing::individual_to_joint(
            observations,
            &indexing::step_sizes(&self.nr_observations)?,
        ))
    }

    pub fn transition(mut self, s: usize, ja: usize, s_next: usize, p: f64) -> Self {
        match self.transitions.get_mut([s, ja, s_next]) {
            Some(entry) => *entry = p,
            None => self.fail(out_of_range("transition", &[s, ja, s_next], self.transitions.shape())),
        }
        self
    }

    pub fn observation(mut self, ja: usize, s_next: usize, jo: usize, p: f64) -> Self {
        match self.observations.get_mut([ja, s_next, jo]) {
            Some(entry) => *entry = p,
            None => self.fail(out_of_range("observation", &[ja, s_next, jo], self.observations.shape())),
        }
        self
    }

    pub fn reward(mut self, s: usize, ja: usize, r: f64) -> Self {
        match self.rewards.get_mut([s, ja]) {
            Some(entry) => *entry = r,
            None => self.fail(out_of_range("reward", &[s, ja], self.rewards.shape())),
        }
        self
    }

    /// Replace the whole `[s, ja, s']` transition table
    pub fn transitions(mut self, table: Array3<f64>) -> Self {
        if table.shape() == self.transitions.shape() {
            self.transitions = table;
        } else {
            let expected = format!("transition table {:?}", self.transitions.shape());
            self.fail(PlannerError::dimension_mismatch(expected, format!("{:?}", table.shape())));
        }
        self
    }

    /// Replace the whole `[ja, s', jo]` observation table
    pub fn observations(mut self, table: Array3<f64>) -> Self {
        if table.shape() == self.observations.shape() {
            self.observations = table;
        } else {
            let expected = format!("observation table {:?}", self.observations.shape());
            self.fail(PlannerError::dimension_mismatch(expected, format!("{:?}", table.shape())));
        }
        self
    }

    /// Replace the whole `[s, ja]` reward table
    pub fn rewards(mut self, table: Array2<f64>) -> Self {
        if table.shape() == self.rewards.shape() {
            self.rewards = table;
        } else {
            let expected = format!("reward table {:?}", self.rewards.shape());
            self.fail(PlannerError::dimension_mismatch(expected, format!("{:?}", table.shape())));
        }
        self
    }

    pub fn initial_state_distribution(mut self, isd: Vec<f64>) -> Self {
        if isd.len() == self.nr_states {
            self.isd = Some(Array1::from_vec(isd));
        } else {
            let expected = format!("{} initial state probabilities", self.nr_states);
            self.fail(PlannerError::dimension_mismatch(expected, format!("{}", isd.len())));
        }
        self
    }

    fn fail(&mut self, err: PlannerError) {
        self.error.get_or_insert(err);
    }

    /// Validate and build the model
    pub fn build(self) -> Result<DecPomdp> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.nr_states == 0 {
            return Err(PlannerError::invalid_parameter("nr_states", "must be at least 1"));
        }
        check_discount(self.discount)?;

        let isd = self
            .isd
            .unwrap_or_else(|| Array1::from_elem(self.nr_states, 1.0 / self.nr_states as f64));
        check_distribution(isd.iter(), "initial state probabilities", self.tolerance)?;

        for s in 0..self.nr_states {
            for ja in 0..self.nr_joint_actions {
                let row = self.transitions.slice(s![s, ja, ..]);
                check_distribution(
                    row.iter(),
                    &format!("transition probabilities T({}, {}, ·)", s, ja),
                    self.tolerance,
                )?;
            }
        }
        for ja in 0..self.nr_joint_actions {
            for s_next in 0..self.nr_states {
                let row = self.observations.slice(s![ja, s_next, ..]);
                check_distribution(
                    row.iter(),
                    &format!("observation probabilities O({}, {}, ·)", ja, s_next),
                    self.tolerance,
                )?;
            }
        }

        Ok(DecPomdp {
            name: self.name,
            action_steps: indexing::step_sizes(&self.nr_actions)?,
            observation_steps: indexing::step_sizes(&self.nr_observations)?,
            nr_states: self.nr_states,
            nr_actions: self.nr_actions,
            nr_observations: self.nr_observations,
            transitions: self.transitions,
            observations: self.observations,
            rewards: self.rewards,
            isd,
            discount: self.discount,
        })
    }
}

fn out_of_range(table: &str, index: &[usize], shape: &[usize]) -> PlannerError {
    PlannerError::dimension_mismatch(
        format!("{} index within {:?}", table, shape),
        format!("{:?}", index),
    )
}

/// Fail unless the values are non-negative and sum to one within `tolerance`.
pub(crate) fn check_distribution<'a>(
    values: impl Iterator<Item = &'a f64>,
    what: &str,
    tolerance: f64,
) -> Result<()> {
    let mut sum = 0.0;
    for &p in values {
        if p < 0.0 || !p.is_finite() {
            return Err(PlannerError::inconsistent(format!("{} (entry {})", what, p), sum, tolerance));
        }
        sum += p;
    }
    if (sum - 1.0).abs() > tolerance {
        return Err(PlannerError::inconsistent(what, sum, tolerance));
    }
    Ok(())
}
