use std::fmt;

/// Result type for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Main error type for the planning library
#[derive(Debug, Clone)]
pub enum PlannerError {
    /// A probability table does not sum to one
    ModelInconsistency {
        what: String,
        sum: f64,
        tolerance: f64,
    },

    /// Invalid dimensions for a table, vector or index
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// An index space or enumeration does not fit the index width.
    ///
    /// This means the chosen solver / backup combination is infeasible for the
    /// problem size, not that the planner is wrong.
    Overflow(String),

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Malformed line in a text file
    Parse {
        line: usize,
        reason: String,
    },

    /// IO errors (file operations)
    Io(String),

    /// Serialization/deserialization errors
    Serialization(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::ModelInconsistency { what, sum, tolerance } => {
                write!(
                    f,
                    "Model inconsistency: {} do not sum to 1 (sum = {:.15}, tolerance = {:e})",
                    what, sum, tolerance
                )
            }
            PlannerError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            PlannerError::Overflow(msg) => write!(f, "Overflow: {}", msg),
            PlannerError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            PlannerError::Parse { line, reason } => {
                write!(f, "Parse error on line {}: {}", line, reason)
            }
            PlannerError::Io(msg) => write!(f, "IO error: {}", msg),
            PlannerError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {}

// Conversion from std::io::Error
impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::Io(err.to_string())
    }
}

// Conversion from bincode::Error
impl From<bincode::Error> for PlannerError {
    fn from(err: bincode::Error) -> Self {
        PlannerError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl PlannerError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        PlannerError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        PlannerError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn inconsistent<S: Into<String>>(what: S, sum: f64, tolerance: f64) -> Self {
        PlannerError::ModelInconsistency {
            what: what.into(),
            sum,
            tolerance,
        }
    }
}
