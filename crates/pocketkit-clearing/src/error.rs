//! Error handling for the clearing pipeline.
//!
//! Only the two hard failure modes surface as `Err`: configuration
//! faults and structural invariant violations. Infeasible pockets,
//! abandoned branches and engagement band exits are graded softer —
//! they log and leave the partial path intact.

use thiserror::Error;

/// Clearing error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClearingError {
    /// Mutually exclusive or out-of-range generator options
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// A branch was materialised without any curve points
    #[error("Branch {branch} has an empty medial curve")]
    EmptyBranchCurve {
        /// Index of the offending branch.
        branch: usize,
    },
}

impl ClearingError {
    /// Create a configuration error from a string message
    pub fn config(reason: impl Into<String>) -> Self {
        ClearingError::Config {
            reason: reason.into(),
        }
    }
}

/// Result type using ClearingError
pub type Result<T> = std::result::Result<T, ClearingError>;
