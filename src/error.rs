//! Error types for the grouping pipeline.

use thiserror::Error as ThisError;

/// Errors raised by any stage of the grouping pipeline.
///
/// No stage returns a partially processed partition: every failure surfaces
/// here and the caller decides how to proceed.
#[derive(Debug, ThisError)]
pub enum GroupingError {
    /// Malformed input: bad group count, label out of range, invalid
    /// coordinates, inconsistent configuration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A proximity component is larger than one group can hold.
    #[error(
        "hard grouping infeasible: component {component} has {size} members \
         but group capacity is {capacity} (members {members:?})"
    )]
    InfeasibleComponent {
        /// Component index.
        component: usize,
        /// Number of entities in the component.
        size: usize,
        /// Group capacity.
        capacity: usize,
        /// Leading member indices, for diagnostics.
        members: Vec<usize>,
    },

    /// No group had room left for a component during initial assignment.
    #[error("component {component} of size {size} does not fit into any group")]
    ComponentUnplaceable {
        /// Component index.
        component: usize,
        /// Number of entities in the component.
        size: usize,
    },

    /// Capacity balancing did not reach exact sizes within its budget.
    #[error("capacity balancing did not converge within {iterations} iterations")]
    BalanceNotConverged {
        /// Iteration budget that was exhausted.
        iterations: usize,
    },

    /// Capacity balancing found unbalanced groups but no legal move.
    #[error("capacity balancing stalled: over-capacity groups {over:?}, under-capacity groups {under:?}")]
    BalanceStalled {
        /// Groups above capacity.
        over: Vec<usize>,
        /// Groups below capacity.
        under: Vec<usize>,
    },

    /// A stage-boundary check failed. Always fatal.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Reading an input or configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An input or configuration file is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GroupingError>;

impl GroupingError {
    /// Shorthand for [`GroupingError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Shorthand for [`GroupingError::InvariantViolation`].
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}
