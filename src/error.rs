//! Error types for rotation runs.

use thiserror::Error;

use crate::enumerate::RunStatistics;

/// Failure of a rotation run.
///
/// An infeasible rotation is not an error: it is reported as a run that
/// found zero solutions.
#[derive(Debug, Clone, Error)]
pub enum RotationError {
    /// Structural misconfiguration, detected before any solving starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The solving collaborator failed or ran out of budget mid-search.
    #[error("solver aborted: {reason}")]
    SolverAborted {
        /// Why the collaborator stopped.
        reason: String,
        /// Statistics accumulated up to the abort.
        statistics: RunStatistics,
    },
}

impl RotationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RotationError::InvalidConfig(message.into())
    }

    /// Partial statistics carried by the error, if any.
    pub fn statistics(&self) -> Option<&RunStatistics> {
        match self {
            RotationError::InvalidConfig(_) => None,
            RotationError::SolverAborted { statistics, .. } => Some(statistics),
        }
    }
}

/// Result type alias for rotation operations.
pub type Result<T> = std::result::Result<T, RotationError>;
