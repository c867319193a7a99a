use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::agent::BgPolicyAgent;
use crate::belief::JointBelief;
use crate::error::{PlannerError, Result};
use crate::model::{sampling, DecPomdpModel};

/// Summary statistics of a collection of returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl ReturnStatistics {
    pub fn from_slice(values: &[f64]) -> Self {
        if values.is_empty() {
            return ReturnStatistics {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
                count: 0,
            };
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        ReturnStatistics {
            mean,
            std: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count,
        }
    }
}

/// Outcome of a batch of simulated episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub discounted: ReturnStatistics,
    pub undiscounted: ReturnStatistics,
}

impl SimulationResult {
    pub fn mean_discounted(&self) -> f64 {
        self.discounted.mean
    }

    pub fn mean_undiscounted(&self) -> f64 {
        self.undiscounted.mean
    }

    /// Save as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}

/// Monte-Carlo evaluation of a [`BgPolicyAgent`]
#[derive(Debug, Clone)]
pub struct Simulator {
    nr_runs: usize,
    horizon: usize,
    seed: u64,
}

impl Simulator {
    pub fn new(nr_runs: usize, horizon: usize, seed: u64) -> Result<Self> {
        if nr_runs == 0 {
            return Err(PlannerError::invalid_parameter("nr_runs", "must be at least 1"));
        }
        if horizon == 0 {
            return Err(PlannerError::invalid_parameter("horizon", "must be at least 1"));
        }
        Ok(Simulator { nr_runs, horizon, seed })
    }

    /// Run every episode; episode `i` draws from a generator seeded with
    /// `seed + i`.
    pub fn run<M: DecPomdpModel + ?Sized>(&self, model: &M, agent: &BgPolicyAgent<'_, M>) -> Result<SimulationResult> {
        let mut discounted = Vec::with_capacity(self.nr_runs);
        let mut undiscounted = Vec::with_capacity(self.nr_runs);
        for run in 0..self.nr_runs {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(run as u64));
            let (d, u) = self.episode(model, agent, &mut rng)?;
            discounted.push(d);
            undiscounted.push(u);
        }
        let result = SimulationResult {
            discounted: ReturnStatistics::from_slice(&discounted),
            undiscounted: ReturnStatistics::from_slice(&undiscounted),
        };
        log::info!(
            "{} runs of {} steps: discounted return {:.4} ± {:.4}",
            self.nr_runs,
            self.horizon,
            result.discounted.mean,
            result.discounted.std
        );
        Ok(result)
    }

    fn episode<M: DecPomdpModel + ?Sized>(
        &self,
        model: &M,
        agent: &BgPolicyAgent<'_, M>,
        rng: &mut StdRng,
    ) -> Result<(f64, f64)> {
        let gamma = model.discount();
        let mut belief = model.initial_belief();
        let mut state = sampling::sample_initial_state(model, rng)?;
        let mut previous: Option<(usize, usize)> = None;
        let mut discounted = 0.0;
        let mut undiscounted = 0.0;
        let mut weight = 1.0;

        for _ in 0..self.horizon {
            let ja = match previous {
                None => agent.first_action(&belief),
                Some((prev_ja, prev_jo)) => {
                    let observations = model.joint_to_individual_observations(prev_jo);
                    let ja = agent.next_action(&belief, prev_ja, &observations)?;
                    // the previous joint observation is now common knowledge
                    if let Some((next_belief, _)) = belief.update(model, prev_ja, prev_jo) {
                        belief = next_belief;
                    }
                    ja
                }
            };
            let reward = model.reward(state, ja);
            discounted += weight * reward;
            undiscounted += reward;
            weight *= gamma;

            let next_state = sampling::sample_successor(model, state, ja, rng)?;
            let jo = sampling::sample_observation(model, ja, next_state, rng)?;
            state = next_state;
            previous = Some((ja, jo));
        }
        Ok((discounted, undiscounted))
    }
}
