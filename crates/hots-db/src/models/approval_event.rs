//! Approval event model.
//!
//! A concrete, per-approver decision record derived from a workflow step at
//! ticket-creation time. Events sharing a `step_order` approve in parallel;
//! levels advance sequentially. Each row is mutated exactly once, by the
//! approver it names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Decision state of an approval event.
///
/// Persisted as a smallint code (0=waiting, 1=approved, 2=rejected), the
/// encoding the UI and reporting queries already consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Not yet decided.
    Waiting = 0,
    /// Approved by the named approver.
    Approved = 1,
    /// Rejected by the named approver.
    Rejected = 2,
}

/// One approver's decision record for one ticket level.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApprovalEvent {
    /// Unique identifier.
    pub id: Uuid,

    /// The ticket this event belongs to.
    pub ticket_id: Uuid,

    /// The user responsible for this decision.
    pub approver_id: Uuid,

    /// Approval level; events at the same level approve in parallel.
    pub step_order: i32,

    /// Decision state.
    pub status: EventStatus,

    /// Approver note, or the rejection remark.
    pub note: Option<String>,

    /// When the decision was made.
    pub decided_at: Option<DateTime<Utc>>,

    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

/// Input for bulk event creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApprovalEvent {
    pub approver_id: Uuid,
    pub step_order: i32,
}

impl ApprovalEvent {
    /// Find all events for a ticket, ordered by level then approver.
    pub async fn find_by_ticket(
        executor: impl sqlx::PgExecutor<'_>,
        ticket_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM approval_events
            WHERE ticket_id = $1
            ORDER BY step_order ASC, approver_id ASC
            ",
        )
        .bind(ticket_id)
        .fetch_all(executor)
        .await
    }

    /// Bulk-insert events for a ticket. Callers run this inside the ticket
    /// creation transaction so a ticket and its events commit together.
    pub async fn create_batch(
        conn: &mut sqlx::PgConnection,
        ticket_id: Uuid,
        events: &[CreateApprovalEvent],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut created = Vec::with_capacity(events.len());
        for event in events {
            let row: Self = sqlx::query_as(
                r"
                INSERT INTO approval_events (ticket_id, approver_id, step_order)
                VALUES ($1, $2, $3)
                RETURNING *
                ",
            )
            .bind(ticket_id)
            .bind(event.approver_id)
            .bind(event.step_order)
            .fetch_one(&mut *conn)
            .await?;
            created.push(row);
        }
        Ok(created)
    }

    /// Record a decision on the single waiting event matching the
    /// (ticket, approver, level) key.
    ///
    /// Returns `None` when no waiting row matches: the approver does not own
    /// an event at that level, or the event was already decided. The
    /// `status = 0` predicate is the double-decision guard.
    pub async fn record_decision(
        executor: impl sqlx::PgExecutor<'_>,
        ticket_id: Uuid,
        approver_id: Uuid,
        step_order: i32,
        status: EventStatus,
        note: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE approval_events
            SET status = $4, note = $5, decided_at = now()
            WHERE ticket_id = $1 AND approver_id = $2 AND step_order = $3 AND status = 0
            RETURNING *
            ",
        )
        .bind(ticket_id)
        .bind(approver_id)
        .bind(step_order)
        .bind(status)
        .bind(note)
        .fetch_optional(executor)
        .await
    }

    /// Find actionable events naming the given approver, oldest first.
    ///
    /// Actionable means the event is waiting, its ticket still accepts
    /// decisions, and the event sits at the ticket's active level (the
    /// lowest level with a waiting event). The filter runs in SQL so
    /// pagination applies to the decidable set, not the raw waiting rows.
    pub async fn find_actionable_for_approver(
        pool: &sqlx::PgPool,
        approver_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT e.* FROM approval_events e
            JOIN tickets t ON t.id = e.ticket_id
            WHERE e.approver_id = $1
              AND e.status = 0
              AND t.status IN ('new', 'in_progress')
              AND e.step_order = (
                  SELECT MIN(w.step_order) FROM approval_events w
                  WHERE w.ticket_id = e.ticket_id AND w.status = 0
              )
            ORDER BY e.created_at ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(approver_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count actionable events naming the given approver.
    pub async fn count_actionable_for_approver(
        pool: &sqlx::PgPool,
        approver_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM approval_events e
            JOIN tickets t ON t.id = e.ticket_id
            WHERE e.approver_id = $1
              AND e.status = 0
              AND t.status IN ('new', 'in_progress')
              AND e.step_order = (
                  SELECT MIN(w.step_order) FROM approval_events w
                  WHERE w.ticket_id = e.ticket_id AND w.status = 0
              )
            ",
        )
        .bind(approver_id)
        .fetch_one(pool)
        .await
    }

    /// Whether this event is still waiting on a decision.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        matches!(self.status, EventStatus::Waiting)
    }

    /// Whether this event was approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self.status, EventStatus::Approved)
    }

    /// Whether this event was rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.status, EventStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: EventStatus) -> ApprovalEvent {
        ApprovalEvent {
            id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            approver_id: Uuid::new_v4(),
            step_order: 1,
            status,
            note: None,
            decided_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(EventStatus::Waiting as i16, 0);
        assert_eq!(EventStatus::Approved as i16, 1);
        assert_eq!(EventStatus::Rejected as i16, 2);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&EventStatus::Waiting).unwrap();
        assert_eq!(json, "\"waiting\"");

        let restored: EventStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(restored, EventStatus::Approved);
    }

    #[test]
    fn test_state_helpers() {
        assert!(event(EventStatus::Waiting).is_waiting());
        assert!(event(EventStatus::Approved).is_approved());
        assert!(event(EventStatus::Rejected).is_rejected());
        assert!(!event(EventStatus::Rejected).is_waiting());
    }
}
