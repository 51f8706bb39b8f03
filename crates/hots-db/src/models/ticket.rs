//! Ticket model.
//!
//! A ticket is a submitted service request moving through approval and
//! fulfillment. Rows are never deleted; only the status transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Submitted, approval events not yet acted on.
    New,
    /// At least one approval level resolved, more still waiting.
    InProgress,
    /// Every approval event approved.
    Approved,
    /// Rejected by any single approver.
    Rejected,
    /// Fulfilled by the assigned team after approval.
    Fulfilled,
    /// Closed out.
    Closed,
}

impl TicketStatus {
    /// Whether the ticket still accepts approval decisions.
    #[must_use]
    pub fn is_awaiting_approval(self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }

    /// Whether the approval workflow reached a terminal decision.
    #[must_use]
    pub fn is_decided(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// The snake_case name used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Fulfilled => "fulfilled",
            Self::Closed => "closed",
        }
    }

    /// Validate a fulfillment-side transition. The approval engine owns the
    /// `new`/`in_progress`/`approved`/`rejected` transitions; only the
    /// post-approval hand-off goes through here.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Approved, Self::Fulfilled) | (Self::Fulfilled, Self::Closed)
        )
    }
}

/// A service request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier.
    pub id: Uuid,

    /// User who submitted the request.
    pub creator_id: Uuid,

    /// Catalog service the request is for.
    pub service_id: Uuid,

    /// Current lifecycle status.
    pub status: TicketStatus,

    /// Team responsible for fulfillment after approval.
    pub assigned_team_id: Option<Uuid>,

    /// Specific user the ticket is assigned to, if any.
    pub assigned_user_id: Option<Uuid>,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,

    /// When the ticket was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    pub creator_id: Uuid,
    pub service_id: Uuid,
    pub assigned_team_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
}

/// Filter for listing tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub creator_id: Option<Uuid>,
}

impl Ticket {
    /// Find a ticket by ID.
    pub async fn find_by_id(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM tickets
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Find a ticket by ID, locking the row for the current transaction.
    ///
    /// Used by the decision flow to serialize concurrent decisions against
    /// the same ticket.
    pub async fn find_by_id_for_update(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM tickets
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Create a new ticket in `new` status.
    pub async fn create(
        executor: impl sqlx::PgExecutor<'_>,
        input: CreateTicket,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO tickets (creator_id, service_id, assigned_team_id, assigned_user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(input.creator_id)
        .bind(input.service_id)
        .bind(input.assigned_team_id)
        .bind(input.assigned_user_id)
        .fetch_one(executor)
        .await
    }

    /// Update the ticket status.
    pub async fn update_status(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE tickets
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await
    }

    /// List tickets matching the filter, newest first.
    pub async fn list(
        pool: &sqlx::PgPool,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM tickets
            WHERE ($1::ticket_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR creator_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(filter.status)
        .bind(filter.creator_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count tickets matching the filter.
    pub async fn count(pool: &sqlx::PgPool, filter: &TicketFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM tickets
            WHERE ($1::ticket_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR creator_id = $2)
            ",
        )
        .bind(filter.status)
        .bind(filter.creator_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let restored: TicketStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(restored, TicketStatus::Rejected);
    }

    #[test]
    fn test_awaiting_approval_states() {
        assert!(TicketStatus::New.is_awaiting_approval());
        assert!(TicketStatus::InProgress.is_awaiting_approval());
        assert!(!TicketStatus::Approved.is_awaiting_approval());
        assert!(!TicketStatus::Rejected.is_awaiting_approval());
        assert!(!TicketStatus::Fulfilled.is_awaiting_approval());
    }

    #[test]
    fn test_fulfillment_transitions() {
        assert!(TicketStatus::Approved.can_transition_to(TicketStatus::Fulfilled));
        assert!(TicketStatus::Fulfilled.can_transition_to(TicketStatus::Closed));

        assert!(!TicketStatus::New.can_transition_to(TicketStatus::Fulfilled));
        assert!(!TicketStatus::Rejected.can_transition_to(TicketStatus::Fulfilled));
        assert!(!TicketStatus::Approved.can_transition_to(TicketStatus::Closed));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Fulfilled));
    }

    #[test]
    fn test_decided_states() {
        assert!(TicketStatus::Approved.is_decided());
        assert!(TicketStatus::Rejected.is_decided());
        assert!(!TicketStatus::InProgress.is_decided());
    }
}
