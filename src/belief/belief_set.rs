use std::path::Path;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Belief, JointBelief, SparseBelief, SPARSE_BELIEF_THRESHOLD};
use crate::error::{PlannerError, Result};
use crate::model::discrete::DEFAULT_TOLERANCE;
use crate::model::{sampling, DecPomdpModel};
use crate::planner::qmdp::Qmdp;

/// Policy followed while sampling beliefs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingPolicy {
    /// Uniformly random joint actions
    Random,
    /// QMDP-greedy joint actions, random with the exploration probability
    Qmdp,
}

/// Monte-Carlo sampler for belief sets
#[derive(Clone, Debug)]
pub struct BeliefSampler {
    nr_beliefs: usize,
    policy: SamplingPolicy,
    exploration_probability: f64,
    rollout_length: usize,
    qmdp_horizon: Option<usize>,
}

impl BeliefSampler {
    pub fn new(nr_beliefs: usize) -> Self {
        BeliefSampler {
            nr_beliefs,
            policy: SamplingPolicy::Random,
            exploration_probability: 0.1,
            rollout_length: 20,
            qmdp_horizon: None,
        }
    }

    pub fn policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn exploration_probability(mut self, p: f64) -> Self {
        self.exploration_probability = p;
        self
    }

    /// Number of steps before a rollout restarts from the initial belief
    pub fn rollout_length(mut self, length: usize) -> Self {
        self.rollout_length = length;
        self
    }

    /// Horizon for the QMDP heuristic; required for undiscounted models
    pub fn qmdp_horizon(mut self, horizon: Option<usize>) -> Self {
        self.qmdp_horizon = horizon;
        self
    }

    /// Sample the belief set.
    ///
    /// The initial belief comes first; the rest are the beliefs reached by
    /// rollouts from a state drawn from the initial state distribution.
    pub fn sample<M, R>(&self, model: &M, rng: &mut R) -> Result<BeliefSet>
    where
        M: DecPomdpModel + ?Sized,
        R: Rng + ?Sized,
    {
        if self.nr_beliefs == 0 {
            return Err(PlannerError::invalid_parameter("nr_beliefs", "must be at least 1"));
        }
        if self.rollout_length == 0 {
            return Err(PlannerError::invalid_parameter("rollout_length", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.exploration_probability) {
            return Err(PlannerError::invalid_parameter(
                "exploration_probability".to_string(),
                format!("must be in [0, 1], got {}", self.exploration_probability),
            ));
        }
        let qmdp = match self.policy {
            SamplingPolicy::Qmdp => Some(Qmdp::compute(model, self.qmdp_horizon)?),
            SamplingPolicy::Random => None,
        };

        let b0 = model.initial_belief();
        let nr_ja = model.nr_joint_actions();
        let mut beliefs = Vec::with_capacity(self.nr_beliefs);
        beliefs.push(b0.clone());

        let mut rollouts = 0usize;
        while beliefs.len() < self.nr_beliefs {
            rollouts += 1;
            let mut state = sampling::sample_initial_state(model, rng)?;
            let mut belief = b0.clone();
            for _ in 0..self.rollout_length {
                let ja = match &qmdp {
                    Some(q) if rng.gen::<f64>() >= self.exploration_probability => q.greedy_action(&belief),
                    _ => rng.gen_range(0..nr_ja),
                };
                let next_state = sampling::sample_successor(model, state, ja, rng)?;
                let jo = sampling::sample_observation(model, ja, next_state, rng)?;
                let Some((next_belief, _)) = belief.update(model, ja, jo) else {
                    break;
                };
                beliefs.push(next_belief.clone());
                if beliefs.len() == self.nr_beliefs {
                    break;
                }
                state = next_state;
                belief = next_belief;
            }
        }
        log::info!(
            "sampled {} beliefs in {} rollouts ({:?} policy)",
            beliefs.len(),
            rollouts,
            self.policy
        );
        Ok(BeliefSet { beliefs })
    }
}

/// Ordered, fixed set of joint beliefs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefSet {
    beliefs: Vec<Belief>,
}

impl BeliefSet {
    /// Wrap beliefs that all range over the same number of states
    pub fn from_beliefs(beliefs: Vec<Belief>) -> Result<Self> {
        if let Some(first) = beliefs.first() {
            let n = first.nr_states();
            if let Some(other) = beliefs.iter().find(|b| b.nr_states() != n) {
                return Err(PlannerError::dimension_mismatch(
                    format!("beliefs over {} states", n),
                    format!("a belief over {} states", other.nr_states()),
                ));
            }
        }
        Ok(BeliefSet { beliefs })
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    pub fn get(&self, k: usize) -> &Belief {
        &self.beliefs[k]
    }

    pub fn beliefs(&self) -> &[Belief] {
        &self.beliefs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Belief> {
        self.beliefs.iter()
    }

    /// One belief per line: probabilities, or `state:probability` tokens for
    /// beliefs over more than [`SPARSE_BELIEF_THRESHOLD`] states.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for belief in &self.beliefs {
            let line: Vec<String> = if belief.nr_states() > SPARSE_BELIEF_THRESHOLD {
                let dense = belief.to_dense();
                dense
                    .iter()
                    .enumerate()
                    .filter(|(_, &p)| p != 0.0)
                    .map(|(s, p)| format!("{}:{}", s, p))
                    .collect()
            } else {
                belief.to_dense().iter().map(|p| format!("{}", p)).collect()
            };
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Parse the text format; every belief must range over `nr_states` states.
    pub fn from_text(text: &str, nr_states: usize) -> Result<Self> {
        let mut beliefs = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_nr = i + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let belief = if line.contains(':') {
                parse_sparse_line(line, line_nr, nr_states)?
            } else {
                parse_dense_line(line, line_nr, nr_states)?
            };
            belief.sanity_check(DEFAULT_TOLERANCE)?;
            beliefs.push(belief);
        }
        Ok(BeliefSet { beliefs })
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_text())?;
        log::info!("saved {} beliefs to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    pub fn load_text<P: AsRef<Path>>(path: P, nr_states: usize) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let set = Self::from_text(&text, nr_states)?;
        log::info!("loaded {} beliefs from {}", set.len(), path.as_ref().display());
        Ok(set)
    }

    /// Save the belief set to disk in binary form
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a belief set saved with [`BeliefSet::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}

fn parse_value(token: &str, line: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|e| PlannerError::Parse {
        line,
        reason: format!("'{}': {}", token, e),
    })
}

fn parse_dense_line(line: &str, line_nr: usize, nr_states: usize) -> Result<Belief> {
    let values = line
        .split_whitespace()
        .map(|t| parse_value(t, line_nr))
        .collect::<Result<Vec<f64>>>()?;
    if values.len() != nr_states {
        return Err(PlannerError::dimension_mismatch(
            format!("{} probabilities on line {}", nr_states, line_nr),
            format!("{}", values.len()),
        ));
    }
    Ok(Belief::from_probabilities(Array1::from_vec(values)))
}

fn parse_sparse_line(line: &str, line_nr: usize, nr_states: usize) -> Result<Belief> {
    let mut entries = Vec::new();
    for token in line.split_whitespace() {
        let (state, prob) = token.split_once(':').ok_or_else(|| PlannerError::Parse {
            line: line_nr,
            reason: format!("expected state:probability, got '{}'", token),
        })?;
        let state = state.parse::<usize>().map_err(|e| PlannerError::Parse {
            line: line_nr,
            reason: format!("'{}': {}", state, e),
        })?;
        entries.push((state, parse_value(prob, line_nr)?));
    }
    let sparse = SparseBelief::from_entries(nr_states, entries)?;
    if nr_states > SPARSE_BELIEF_THRESHOLD {
        Ok(Belief::Sparse(sparse))
    } else {
        Ok(Belief::from_probabilities(sparse.to_dense()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::problems;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sampled_set_starts_with_initial_belief() {
        let model = problems::dec_tiger().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let set = BeliefSampler::new(25).sample(&model, &mut rng).unwrap();
        assert_eq!(set.len(), 25);
        assert_eq!(set.get(0), &model.initial_belief());
        for b in set.iter() {
            assert!(b.sanity_check(1e-9).is_ok());
        }
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let model = problems::dec_tiger().unwrap();
        let sampler = BeliefSampler::new(30)
            .policy(SamplingPolicy::Qmdp)
            .exploration_probability(0.3);
        let a = sampler.sample(&model, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sampler.sample(&model, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_exploration() {
        let model = problems::dec_tiger().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let result = BeliefSampler::new(5).exploration_probability(1.5).sample(&model, &mut rng);
        assert!(matches!(result, Err(PlannerError::InvalidParameter { .. })));
    }

    #[test]
    fn test_text_round_trip() {
        let set = BeliefSet::from_beliefs(vec![
            Belief::uniform(3),
            Belief::from_probabilities(array![0.1, 0.2, 0.7]),
        ])
        .unwrap();
        let parsed = BeliefSet::from_text(&set.to_text(), 3).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_sparse_lines_are_accepted() {
        let parsed = BeliefSet::from_text("0:0.25 2:0.75\n", 3).unwrap();
        assert_eq!(parsed.get(0).to_dense(), array![0.25, 0.0, 0.75]);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            BeliefSet::from_text("0.5 abc\n", 2),
            Err(PlannerError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            BeliefSet::from_text("0.5 0.5\n1.0\n", 2),
            Err(PlannerError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            BeliefSet::from_text("0.5 0.6\n", 2),
            Err(PlannerError::ModelInconsistency { .. })
        ));
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let result = BeliefSet::from_beliefs(vec![Belief::uniform(2), Belief::uniform(3)]);
        assert!(result.is_err());
    }
}
