use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::backup::BackupType;
use crate::bayesian_game::solvers::BgSolverType;
use crate::belief::SamplingPolicy;
use crate::error::{PlannerError, Result};
use crate::model::discrete::DEFAULT_TOLERANCE;

/// Starting value function of an infinite-horizon run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitializeWith {
    /// One all-zero vector per joint action
    Zero,
    /// `R(·, a)` for every joint action
    ImmediateReward,
    /// The constant `min R / (1 - γ)` for every joint action, a lower bound
    /// on any policy's value
    LowerBound,
}

/// Perseus planner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerseusConfig {
    pub backup_type: BackupType,
    pub bg_solver: BgSolverType,

    /// Size of the sampled belief set
    pub nr_beliefs: usize,
    pub belief_sampling: SamplingPolicy,
    pub exploration_probability: f64,
    pub rollout_length: usize,

    pub initialize_with: InitializeWith,
    pub min_iterations: usize,
    pub max_iterations: usize,
    /// Stop once the value at the initial belief moves by less than this
    pub convergence_threshold: f64,
    /// Consecutive iterations below the threshold needed to stop
    pub convergence_patience: usize,
    /// Back up every belief every iteration instead of Perseus' random subset
    pub compute_vector_for_each_belief: bool,

    /// Plan without writing anything to `output_dir`
    pub dryrun: bool,
    pub random_seed: u64,
    /// Worker threads for the backup sweep; 1 runs sequentially
    pub threads: usize,
    /// Plan exactly this many stages instead of until convergence
    pub horizon: Option<usize>,
    /// Soft budget, checked between iterations
    pub time_limit_secs: Option<f64>,
    /// Tolerance on probability sums
    pub tolerance: f64,
    pub output_dir: Option<PathBuf>,
}

impl Default for PerseusConfig {
    fn default() -> Self {
        PerseusConfig {
            backup_type: BackupType::OnlyKeepMax,
            bg_solver: BgSolverType::Exhaustive,
            nr_beliefs: 100,
            belief_sampling: SamplingPolicy::Random,
            exploration_probability: 0.1,
            rollout_length: 20,
            initialize_with: InitializeWith::LowerBound,
            min_iterations: 1,
            max_iterations: 100,
            convergence_threshold: 1e-4,
            convergence_patience: 2,
            compute_vector_for_each_belief: false,
            dryrun: false,
            random_seed: 42,
            threads: 1,
            horizon: None,
            time_limit_secs: None,
            tolerance: DEFAULT_TOLERANCE,
            output_dir: None,
        }
    }
}

impl PerseusConfig {
    pub fn builder() -> PerseusConfigBuilder {
        PerseusConfigBuilder::new()
    }

    /// Check every parameter, reporting the first invalid one
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &str, reason: String) -> Result<()> {
            Err(PlannerError::InvalidParameter {
                name: name.to_string(),
                reason,
            })
        }

        if self.nr_beliefs == 0 {
            return invalid("nr_beliefs", "must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.exploration_probability) {
            return invalid(
                "exploration_probability",
                format!("must be in [0, 1], got {}", self.exploration_probability),
            );
        }
        if self.rollout_length == 0 {
            return invalid("rollout_length", "must be at least 1".to_string());
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations", "must be at least 1".to_string());
        }
        if self.min_iterations > self.max_iterations {
            return invalid(
                "min_iterations",
                format!("{} exceeds max_iterations {}", self.min_iterations, self.max_iterations),
            );
        }
        if !(self.convergence_threshold >= 0.0) {
            return invalid(
                "convergence_threshold",
                format!("must be non-negative, got {}", self.convergence_threshold),
            );
        }
        if self.convergence_patience == 0 {
            return invalid("convergence_patience", "must be at least 1".to_string());
        }
        if self.threads == 0 {
            return invalid("threads", "must be at least 1".to_string());
        }
        if self.horizon == Some(0) {
            return invalid("horizon", "a finite horizon must be at least 1".to_string());
        }
        if let Some(limit) = self.time_limit_secs {
            if !(limit > 0.0) {
                return invalid("time_limit_secs", format!("must be positive, got {}", limit));
            }
        }
        if !(self.tolerance > 0.0) {
            return invalid("tolerance", format!("must be positive, got {}", self.tolerance));
        }
        if let BgSolverType::AlternatingMaximization { restarts: 0 } = self.bg_solver {
            return invalid("am_restarts", "alternating maximization needs at least 1 restart".to_string());
        }
        Ok(())
    }

    /// Save as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load and validate a configuration saved with [`PerseusConfig::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: PerseusConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`PerseusConfig`]
pub struct PerseusConfigBuilder {
    config: PerseusConfig,
}

impl PerseusConfigBuilder {
    pub fn new() -> Self {
        PerseusConfigBuilder {
            config: PerseusConfig::default(),
        }
    }

    pub fn backup_type(mut self, backup_type: BackupType) -> Self {
        self.config.backup_type = backup_type;
        self
    }

    pub fn bg_solver(mut self, solver: BgSolverType) -> Self {
        self.config.bg_solver = solver;
        self
    }

    /// Use alternating maximization with `restarts` random starts
    pub fn am_restarts(mut self, restarts: usize) -> Self {
        self.config.bg_solver = BgSolverType::AlternatingMaximization { restarts };
        self
    }

    pub fn nr_beliefs(mut self, nr_beliefs: usize) -> Self {
        self.config.nr_beliefs = nr_beliefs;
        self
    }

    pub fn belief_sampling(mut self, policy: SamplingPolicy) -> Self {
        self.config.belief_sampling = policy;
        self
    }

    pub fn exploration_probability(mut self, p: f64) -> Self {
        self.config.exploration_probability = p;
        self
    }

    pub fn rollout_length(mut self, length: usize) -> Self {
        self.config.rollout_length = length;
        self
    }

    pub fn initialize_with(mut self, init: InitializeWith) -> Self {
        self.config.initialize_with = init;
        self
    }

    pub fn min_iterations(mut self, n: usize) -> Self {
        self.config.min_iterations = n;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.config.max_iterations = n;
        self
    }

    pub fn convergence_threshold(mut self, threshold: f64) -> Self {
        self.config.convergence_threshold = threshold;
        self
    }

    pub fn convergence_patience(mut self, patience: usize) -> Self {
        self.config.convergence_patience = patience;
        self
    }

    pub fn compute_vector_for_each_belief(mut self, each: bool) -> Self {
        self.config.compute_vector_for_each_belief = each;
        self
    }

    pub fn dryrun(mut self, dryrun: bool) -> Self {
        self.config.dryrun = dryrun;
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.config.horizon = Some(horizon);
        self
    }

    pub fn time_limit_secs(mut self, secs: f64) -> Self {
        self.config.time_limit_secs = Some(secs);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PerseusConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for PerseusConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
