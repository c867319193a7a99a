//! Dense and sparse storage for Bayesian game tables.
//!
//! Which variant backs a game is decided once, from the number of joint types;
//! both answer every query identically.

use std::collections::HashMap;

use ndarray::Array2;

/// Joint-type probabilities
#[derive(Clone, Debug)]
pub enum ProbabilityTable {
    Dense(Vec<f64>),
    Sparse(HashMap<usize, f64>),
}

impl ProbabilityTable {
    pub fn new(nr_joint_types: usize, sparse: bool) -> Self {
        if sparse {
            ProbabilityTable::Sparse(HashMap::new())
        } else {
            ProbabilityTable::Dense(vec![0.0; nr_joint_types])
        }
    }

    pub fn get(&self, jt: usize) -> f64 {
        match self {
            ProbabilityTable::Dense(p) => p[jt],
            ProbabilityTable::Sparse(p) => p.get(&jt).copied().unwrap_or(0.0),
        }
    }

    pub fn set(&mut self, jt: usize, p: f64) {
        match self {
            ProbabilityTable::Dense(table) => table[jt] = p,
            ProbabilityTable::Sparse(table) => {
                if p == 0.0 {
                    table.remove(&jt);
                } else {
                    table.insert(jt, p);
                }
            }
        }
    }

    pub fn sum(&self) -> f64 {
        match self {
            ProbabilityTable::Dense(p) => p.iter().sum(),
            ProbabilityTable::Sparse(p) => p.values().sum(),
        }
    }

    /// Joint types with non-zero probability, ascending
    pub fn nonzeros(&self) -> Vec<(usize, f64)> {
        match self {
            ProbabilityTable::Dense(p) => p
                .iter()
                .enumerate()
                .filter(|(_, &p)| p != 0.0)
                .map(|(jt, &p)| (jt, p))
                .collect(),
            ProbabilityTable::Sparse(p) => {
                let mut entries: Vec<(usize, f64)> = p.iter().map(|(&jt, &p)| (jt, p)).collect();
                entries.sort_unstable_by_key(|&(jt, _)| jt);
                entries
            }
        }
    }
}

/// Shared utility `U(jt, ja)`
#[derive(Clone, Debug)]
pub enum UtilityTable {
    Dense(Array2<f64>),
    Sparse(HashMap<(usize, usize), f64>),
}

impl UtilityTable {
    pub fn new(nr_joint_types: usize, nr_joint_actions: usize, sparse: bool) -> Self {
        if sparse {
            UtilityTable::Sparse(HashMap::new())
        } else {
            UtilityTable::Dense(Array2::zeros((nr_joint_types, nr_joint_actions)))
        }
    }

    pub fn get(&self, jt: usize, ja: usize) -> f64 {
        match self {
            UtilityTable::Dense(u) => u[[jt, ja]],
            UtilityTable::Sparse(u) => u.get(&(jt, ja)).copied().unwrap_or(0.0),
        }
    }

    pub fn set(&mut self, jt: usize, ja: usize, u: f64) {
        match self {
            UtilityTable::Dense(table) => table[[jt, ja]] = u,
            UtilityTable::Sparse(table) => {
                if u == 0.0 {
                    table.remove(&(jt, ja));
                } else {
                    table.insert((jt, ja), u);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_and_sparse_agree() {
        let mut dense = ProbabilityTable::new(10, false);
        let mut sparse = ProbabilityTable::new(10, true);
        for (jt, p) in [(3, 0.25), (7, 0.75), (1, 0.0)] {
            dense.set(jt, p);
            sparse.set(jt, p);
        }
        assert_eq!(dense.nonzeros(), sparse.nonzeros());
        assert_eq!(dense.sum(), sparse.sum());
        assert_eq!(dense.get(5), sparse.get(5));

        let mut du = UtilityTable::new(10, 4, false);
        let mut su = UtilityTable::new(10, 4, true);
        du.set(3, 2, -1.5);
        su.set(3, 2, -1.5);
        assert_eq!(du.get(3, 2), su.get(3, 2));
        assert_eq!(du.get(0, 0), su.get(0, 0));
    }
}
