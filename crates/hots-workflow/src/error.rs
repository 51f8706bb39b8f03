//! Error types for the workflow engine.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Workflow engine errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    TicketNotFound(Uuid),

    /// Service not found or inactive.
    #[error("Service not found: {0}")]
    ServiceNotFound(Uuid),

    /// Creator account not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Workflow group not found.
    #[error("Workflow group not found: {0}")]
    WorkflowGroupNotFound(Uuid),

    /// Workflow group name already exists.
    #[error("Workflow group name already exists: {0}")]
    WorkflowGroupNameExists(String),

    /// Workflow group is attached to services and cannot be deleted.
    #[error("Workflow group {id} is attached to {count} service(s)")]
    WorkflowGroupInUse { id: Uuid, count: i64 },

    /// Step list is empty, too long, or a step's references are inconsistent
    /// with its kind.
    #[error("Invalid workflow steps: {0}")]
    InvalidWorkflowSteps(String),

    /// Ticket is not in a state that accepts approval decisions.
    #[error("Ticket {0} is not awaiting approval")]
    TicketNotAwaitingApproval(Uuid),

    /// Decision was submitted for a level that is not the active one.
    #[error("Step {requested} is not the active approval level ({active:?})")]
    StepNotActive { requested: i32, active: Option<i32> },

    /// Acting user does not own a waiting event at the claimed level.
    #[error("No waiting approval for this user at step {step_order}")]
    NotDesignatedApprover { step_order: i32 },

    /// Rejection requires a non-empty remark.
    #[error("A rejection remark is required")]
    RejectionRemarkRequired,

    /// More detail slots than the ticket payload supports.
    #[error("Ticket details exceed {max} slots (got {got})")]
    DetailSlotsExceeded { got: usize, max: usize },

    /// A step's approver set could not be computed.
    #[error("Could not resolve approvers for step {step_order}: {reason}")]
    ApproverResolution { step_order: i32, reason: String },

    /// Invalid fulfillment-side status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WorkflowError {
    /// Whether this error maps to a not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TicketNotFound(_)
                | Self::ServiceNotFound(_)
                | Self::UserNotFound(_)
                | Self::WorkflowGroupNotFound(_)
        )
    }

    /// Whether this error maps to a conflict condition.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::WorkflowGroupNameExists(_)
                | Self::WorkflowGroupInUse { .. }
                | Self::TicketNotAwaitingApproval(_)
                | Self::StepNotActive { .. }
                | Self::InvalidStatusTransition { .. }
        )
    }

    /// Whether this error maps to an authorization failure.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::NotDesignatedApprover { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(WorkflowError::TicketNotFound(Uuid::new_v4()).is_not_found());
        assert!(!WorkflowError::RejectionRemarkRequired.is_not_found());
    }

    #[test]
    fn test_conflict_classification() {
        assert!(WorkflowError::TicketNotAwaitingApproval(Uuid::new_v4()).is_conflict());
        assert!(WorkflowError::StepNotActive {
            requested: 2,
            active: Some(1)
        }
        .is_conflict());
        assert!(!WorkflowError::RejectionRemarkRequired.is_conflict());
    }

    #[test]
    fn test_forbidden_classification() {
        assert!(WorkflowError::NotDesignatedApprover { step_order: 1 }.is_forbidden());
        assert!(!WorkflowError::TicketNotFound(Uuid::new_v4()).is_forbidden());
    }
}
