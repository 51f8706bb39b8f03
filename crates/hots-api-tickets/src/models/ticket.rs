//! Request and response models for ticket endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use hots_db::models::{Ticket, TicketDetail, TicketStatus};

use super::approval::ApprovalEventView;

/// One labeled detail field of a ticket submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TicketDetailInput {
    /// Field label.
    #[validate(length(min = 1, max = 100))]
    pub label: String,

    /// Submitted value.
    #[validate(length(max = 2000))]
    pub value: String,
}

/// Request to submit a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTicketRequest {
    /// The catalog service being requested.
    pub service_id: Uuid,

    /// Labeled detail fields, at most 16.
    #[validate(
        length(max = 16, message = "At most 16 detail slots are supported"),
        nested
    )]
    #[serde(default)]
    pub details: Vec<TicketDetailInput>,
}

/// Request to move an approved ticket through fulfillment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTicketStatusRequest {
    /// Target status (`fulfilled` or `closed`).
    pub status: TicketStatus,
}

/// A detail slot as rendered to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketDetailSlot {
    pub slot: i16,
    pub label: String,
    pub value: String,
}

impl From<TicketDetail> for TicketDetailSlot {
    fn from(detail: TicketDetail) -> Self {
        Self {
            slot: detail.slot,
            label: detail.label,
            value: detail.value,
        }
    }
}

/// Ticket detail with the aggregated approval event list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    /// Ticket ID.
    pub id: Uuid,

    /// Creator user id.
    pub creator_id: Uuid,

    /// Requested service.
    pub service_id: Uuid,

    /// Current lifecycle status.
    pub status: TicketStatus,

    /// Team assigned for fulfillment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_team_id: Option<Uuid>,

    /// User assigned for fulfillment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<Uuid>,

    /// Labeled detail slots.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<TicketDetailSlot>,

    /// Approval events ordered by level then approver.
    pub approval_events: Vec<ApprovalEventView>,

    /// When the ticket was submitted.
    pub created_at: DateTime<Utc>,

    /// When the ticket was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TicketResponse {
    /// Assemble the response from the persisted pieces.
    #[must_use]
    pub fn assemble(
        ticket: Ticket,
        details: Vec<TicketDetail>,
        events: Vec<hots_db::models::ApprovalEvent>,
    ) -> Self {
        Self {
            id: ticket.id,
            creator_id: ticket.creator_id,
            service_id: ticket.service_id,
            status: ticket.status,
            assigned_team_id: ticket.assigned_team_id,
            assigned_user_id: ticket.assigned_user_id,
            details: details.into_iter().map(Into::into).collect(),
            approval_events: events.into_iter().map(Into::into).collect(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

/// Query parameters for listing tickets.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListTicketsQuery {
    /// Filter by status.
    pub status: Option<TicketStatus>,

    /// Only tickets created by this user.
    pub creator_id: Option<Uuid>,

    /// Maximum number of results (default: 50, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,

    /// Number of results to skip.
    #[param(minimum = 0)]
    pub offset: Option<i64>,
}

/// Paginated ticket list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketListResponse {
    pub items: Vec<TicketResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
