//! Plain-text alpha-vector format.
//!
//! One vector per line: the joint action index followed by one value per
//! state, whitespace separated. Values are written in Rust's shortest
//! round-trip representation so a save / load cycle is exact.

use std::path::Path;

use ndarray::Array1;

use super::{AlphaVector, ValueFunction};
use crate::error::{PlannerError, Result};

impl ValueFunction {
    pub fn to_text(&self) -> String {
        self.iter()
            .map(|alpha| {
                let values: Vec<String> = alpha.values().iter().map(|v| v.to_string()).collect();
                format!("{} {}\n", alpha.action(), values.join(" "))
            })
            .collect()
    }

    pub fn from_text(text: &str, nr_states: usize) -> Result<Self> {
        let mut vectors = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_nr = i + 1;
            let mut tokens = line.split_whitespace();
            let Some(action) = tokens.next() else {
                continue;
            };
            let action = action.parse::<usize>().map_err(|e| PlannerError::Parse {
                line: line_nr,
                reason: format!("action index '{}': {}", action, e),
            })?;
            let values = tokens
                .map(|t| {
                    t.parse::<f64>().map_err(|e| PlannerError::Parse {
                        line: line_nr,
                        reason: format!("value '{}': {}", t, e),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            if values.len() != nr_states {
                return Err(PlannerError::dimension_mismatch(
                    format!("{} values on line {}", nr_states, line_nr),
                    format!("{}", values.len()),
                ));
            }
            vectors.push(AlphaVector::from_values(Array1::from_vec(values), action));
        }
        Ok(ValueFunction::from_vectors(vectors))
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_text())?;
        log::debug!("wrote {} alpha vectors to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    pub fn load_text<P: AsRef<Path>>(path: P, nr_states: usize) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let vf = Self::from_text(&text, nr_states)?;
        log::debug!("read {} alpha vectors from {}", vf.len(), path.as_ref().display());
        Ok(vf)
    }
}
