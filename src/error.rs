//! Error type for optimizer setup.
//!
//! Errors are only raised before the search starts. Once a run is
//! launched it always produces a result, possibly with hard violations.

use std::fmt;

use crate::validation::ValidationError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Errors raised while preparing an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// A configuration parameter is outside its declared range.
    InvalidConfiguration {
        /// Offending parameter name.
        parameter: &'static str,
        /// What is wrong with it.
        message: String,
    },
    /// The instance records are structurally broken.
    InvalidInstance(Vec<ValidationError>),
    /// More course-hours are required than `slots × rooms` can hold.
    InfeasibleInstance {
        /// Total required course-hours.
        required_hours: usize,
        /// Number of (slot, room) cells.
        capacity: usize,
    },
}

impl OptimizerError {
    pub(crate) fn config(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter,
            message: message.into(),
        }
    }
}

impl fmt::Display for OptimizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerError::InvalidConfiguration { parameter, message } => {
                write!(f, "invalid configuration `{parameter}`: {message}")
            }
            OptimizerError::InvalidInstance(errors) => {
                write!(f, "invalid instance ({} issue(s))", errors.len())?;
                for e in errors {
                    write!(f, "; {e}")?;
                }
                Ok(())
            }
            OptimizerError::InfeasibleInstance {
                required_hours,
                capacity,
            } => write!(
                f,
                "infeasible instance: {required_hours} course-hours required but only {capacity} slot-room cells exist"
            ),
        }
    }
}

impl std::error::Error for OptimizerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_infeasible() {
        let e = OptimizerError::InfeasibleInstance {
            required_hours: 10,
            capacity: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("4"));
    }

    #[test]
    fn test_display_config() {
        let e = OptimizerError::config("mutation_rate", "must be within [0, 1]");
        assert_eq!(
            e.to_string(),
            "invalid configuration `mutation_rate`: must be within [0, 1]"
        );
    }
}
