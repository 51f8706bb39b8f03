//! Request and response models for approval endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use hots_db::models::{ApprovalEvent, EventStatus, TicketStatus};

/// Request to approve a ticket at a given level.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApproveTicketRequest {
    /// The approval level being decided.
    #[validate(range(min = 1))]
    pub step_order: i32,

    /// Optional note from the approver.
    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

/// Request to reject a ticket at a given level.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectTicketRequest {
    /// The approval level being decided.
    #[validate(range(min = 1))]
    pub step_order: i32,

    /// Required remark explaining the rejection.
    #[validate(length(min = 1, max = 2000, message = "Remark is required (1-2000 characters)"))]
    pub remark: String,
}

/// One approval event as rendered to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalEventView {
    /// Approver user id.
    pub approver_id: Uuid,

    /// Approval level.
    pub step_order: i32,

    /// Decision state.
    pub status: EventStatus,

    /// Approver note or rejection remark.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// When the decision was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<ApprovalEvent> for ApprovalEventView {
    fn from(event: ApprovalEvent) -> Self {
        Self {
            approver_id: event.approver_id,
            step_order: event.step_order,
            status: event.status,
            note: event.note,
            decided_at: event.decided_at,
        }
    }
}

/// Response after an approval or rejection action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    /// Ticket ID.
    pub ticket_id: Uuid,

    /// Ticket status after the decision.
    pub new_status: TicketStatus,

    /// Decision that was recorded.
    pub decision: EventStatus,

    /// Whether this decision completed the whole workflow.
    pub finally_approved: bool,

    /// Message about the action.
    pub message: String,
}

/// Query parameters for the pending approval queue.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListPendingApprovalsQuery {
    /// Maximum number of results (default: 50, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,

    /// Number of results to skip.
    #[param(minimum = 0)]
    pub offset: Option<i64>,
}

/// A pending approval item in the acting user's queue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingApprovalItem {
    /// Ticket awaiting this user's decision.
    pub ticket_id: Uuid,

    /// Ticket creator.
    pub creator_id: Uuid,

    /// Requested service.
    pub service_id: Uuid,

    /// Level the user must decide.
    pub step_order: i32,

    /// When the ticket was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Paginated pending approval queue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingApprovalListResponse {
    pub items: Vec<PendingApprovalItem>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
