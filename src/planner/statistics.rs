use std::path::Path;

use serde::{Deserialize, Serialize};

/// Progress of a single Perseus iteration (or finite-horizon stage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationStatistics {
    pub iteration: usize,
    /// Vectors in the value function after the iteration
    pub nr_vectors: usize,
    /// `V(b₀)` after the iteration
    pub value_at_initial_belief: f64,
    /// Beliefs actually backed up
    pub nr_backed_up_beliefs: usize,
    /// Wall-clock seconds since planning started
    pub elapsed_secs: f64,
}

/// Why planning stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Converged,
    MaxIterations,
    TimeLimit,
    HorizonReached,
}

/// Statistics of a whole planning run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningStatistics {
    pub iterations: Vec<IterationStatistics>,
    pub termination: Option<Termination>,
}

impl PlanningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: IterationStatistics) {
        self.iterations.push(stats);
    }

    pub fn last(&self) -> Option<&IterationStatistics> {
        self.iterations.last()
    }

    pub fn nr_iterations(&self) -> usize {
        self.iterations.len()
    }

    /// Values at the initial belief, one per iteration
    pub fn values(&self) -> Vec<f64> {
        self.iterations.iter().map(|s| s.value_at_initial_belief).collect()
    }

    /// Save statistics as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load statistics from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut stats = PlanningStatistics::new();
        stats.record(IterationStatistics {
            iteration: 1,
            nr_vectors: 4,
            value_at_initial_belief: -1.25,
            nr_backed_up_beliefs: 3,
            elapsed_secs: 0.5,
        });
        stats.termination = Some(Termination::Converged);
        stats.save(&path).unwrap();
        let loaded = PlanningStatistics::load(&path).unwrap();
        assert_eq!(loaded, stats);
        assert_eq!(loaded.values(), vec![-1.25]);
    }
}
