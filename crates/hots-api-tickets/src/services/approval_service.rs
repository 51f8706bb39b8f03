//! Approval decision service.
//!
//! Applies approve/reject decisions to a ticket's materialized approval
//! events and derives the resulting ticket status. Decisions run inside a
//! transaction with the ticket row locked, so concurrent decisions against
//! the same ticket serialize; the single-row `UPDATE ... AND status = 0`
//! guard then makes each event decidable exactly once.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hots_db::models::{ApprovalEvent, EventStatus, Ticket, TicketStatus, TriggerEvent};
use hots_workflow::{
    authorize_decision, outcome, Result, TicketEvent, TicketEventPublisher, WorkflowError,
    WorkflowOutcome,
};

/// The result of an approve or reject action.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub ticket: Ticket,
    pub decision: EventStatus,
    /// True when this decision completed the whole workflow approvingly.
    pub finally_approved: bool,
}

/// A pending item in an approver's queue.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub ticket_id: Uuid,
    pub creator_id: Uuid,
    pub service_id: Uuid,
    pub step_order: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Service for approval decisions and the pending queue.
pub struct ApprovalService {
    pool: PgPool,
    publisher: TicketEventPublisher,
}

impl ApprovalService {
    /// Create a new approval service.
    #[must_use]
    pub fn new(pool: PgPool, publisher: TicketEventPublisher) -> Self {
        Self { pool, publisher }
    }

    /// Approve a ticket at the given level on behalf of the acting user.
    ///
    /// The claimed level must be the active one (lowest level with a waiting
    /// event), and the user must own a waiting event there. When the decision
    /// resolves the last waiting event the ticket moves to `approved`;
    /// otherwise it moves to (or stays in) `in_progress`.
    pub async fn approve(
        &self,
        ticket_id: Uuid,
        approver_id: Uuid,
        step_order: i32,
        note: Option<&str>,
    ) -> Result<DecisionOutcome> {
        let mut tx = self.pool.begin().await?;

        let ticket = self
            .locked_decidable_ticket(&mut tx, ticket_id, approver_id, step_order)
            .await?;

        ApprovalEvent::record_decision(
            &mut *tx,
            ticket_id,
            approver_id,
            step_order,
            EventStatus::Approved,
            note,
        )
        .await?
        .ok_or(WorkflowError::NotDesignatedApprover { step_order })?;

        let events = ApprovalEvent::find_by_ticket(&mut *tx, ticket_id).await?;
        let workflow_outcome = outcome(&events);
        let (next_status, finally_approved) = match workflow_outcome {
            WorkflowOutcome::Approved => (TicketStatus::Approved, true),
            WorkflowOutcome::AwaitingApproval => (TicketStatus::InProgress, false),
            // A rejected event alongside an awaiting ticket status should not
            // occur; converge on the terminal status anyway.
            WorkflowOutcome::Rejected => {
                tracing::warn!(
                    ticket_id = %ticket_id,
                    "Approval applied to a ticket with a rejected event; converging to rejected"
                );
                (TicketStatus::Rejected, false)
            }
        };

        let ticket = if ticket.status == next_status {
            ticket
        } else {
            Ticket::update_status(&mut *tx, ticket_id, next_status)
                .await?
                .ok_or(WorkflowError::TicketNotFound(ticket_id))?
        };

        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_id,
            approver_id = %approver_id,
            step_order,
            finally_approved,
            "Ticket approved at level"
        );

        for event_type in approval_trigger_events(workflow_outcome) {
            self.publisher.publish(TicketEvent::new(
                event_type,
                ticket_id,
                ticket.service_id,
                Some(approver_id),
                serde_json::json!({ "step_order": step_order }),
            ));
        }

        Ok(DecisionOutcome {
            ticket,
            decision: EventStatus::Approved,
            finally_approved,
        })
    }

    /// Reject a ticket at the given level on behalf of the acting user.
    ///
    /// Rejection short-circuits the workflow: the ticket moves straight to
    /// `rejected` and remaining waiting events become unreachable. The remark
    /// is mandatory and stored on the event.
    pub async fn reject(
        &self,
        ticket_id: Uuid,
        approver_id: Uuid,
        step_order: i32,
        remark: &str,
    ) -> Result<DecisionOutcome> {
        if remark.trim().is_empty() {
            return Err(WorkflowError::RejectionRemarkRequired);
        }

        let mut tx = self.pool.begin().await?;

        self.locked_decidable_ticket(&mut tx, ticket_id, approver_id, step_order)
            .await?;

        ApprovalEvent::record_decision(
            &mut *tx,
            ticket_id,
            approver_id,
            step_order,
            EventStatus::Rejected,
            Some(remark),
        )
        .await?
        .ok_or(WorkflowError::NotDesignatedApprover { step_order })?;

        let ticket = Ticket::update_status(&mut *tx, ticket_id, TicketStatus::Rejected)
            .await?
            .ok_or(WorkflowError::TicketNotFound(ticket_id))?;

        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_id,
            approver_id = %approver_id,
            step_order,
            "Ticket rejected"
        );

        self.publisher.publish(TicketEvent::new(
            TriggerEvent::OnRejected,
            ticket_id,
            ticket.service_id,
            Some(approver_id),
            serde_json::json!({ "step_order": step_order, "remark": remark }),
        ));

        Ok(DecisionOutcome {
            ticket,
            decision: EventStatus::Rejected,
            finally_approved: false,
        })
    }

    /// Lock the ticket row and verify the acting user may decide the claimed
    /// level.
    async fn locked_decidable_ticket(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ticket_id: Uuid,
        approver_id: Uuid,
        step_order: i32,
    ) -> Result<Ticket> {
        let ticket = Ticket::find_by_id_for_update(&mut **tx, ticket_id)
            .await?
            .ok_or(WorkflowError::TicketNotFound(ticket_id))?;

        let events = ApprovalEvent::find_by_ticket(&mut **tx, ticket_id).await?;
        authorize_decision(&ticket, &events, approver_id, step_order)?;

        Ok(ticket)
    }

    /// The acting user's pending approval queue: waiting events at their
    /// ticket's active level. The active-level filter runs in the query, so
    /// limit/offset paginate the decidable set and `total` counts it.
    pub async fn pending_for_user(
        &self,
        approver_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PendingApproval>, i64)> {
        let actionable =
            ApprovalEvent::find_actionable_for_approver(&self.pool, approver_id, limit, offset)
                .await?;
        let total = ApprovalEvent::count_actionable_for_approver(&self.pool, approver_id).await?;

        let mut items = Vec::with_capacity(actionable.len());
        for event in actionable {
            let Some(ticket) = Ticket::find_by_id(&self.pool, event.ticket_id).await? else {
                continue;
            };
            items.push(PendingApproval {
                ticket_id: ticket.id,
                creator_id: ticket.creator_id,
                service_id: ticket.service_id,
                step_order: event.step_order,
                submitted_at: ticket.created_at,
            });
        }

        Ok((items, total))
    }
}

/// The lifecycle events to publish after a committed approval decision.
///
/// A non-final approval fires `on_step_approved`; completing the workflow
/// fires `on_approved` then `on_final_approved`. The defensive convergence
/// path (a rejected event observed during an approval) publishes nothing:
/// the rejection already fired its own event.
fn approval_trigger_events(outcome: WorkflowOutcome) -> Vec<TriggerEvent> {
    match outcome {
        WorkflowOutcome::Approved => {
            vec![TriggerEvent::OnApproved, TriggerEvent::OnFinalApproved]
        }
        WorkflowOutcome::AwaitingApproval => vec![TriggerEvent::OnStepApproved],
        WorkflowOutcome::Rejected => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_approval_fires_both_completion_events() {
        assert_eq!(
            approval_trigger_events(WorkflowOutcome::Approved),
            vec![TriggerEvent::OnApproved, TriggerEvent::OnFinalApproved]
        );
    }

    #[test]
    fn test_intermediate_approval_fires_step_event() {
        assert_eq!(
            approval_trigger_events(WorkflowOutcome::AwaitingApproval),
            vec![TriggerEvent::OnStepApproved]
        );
    }

    #[test]
    fn test_converged_rejection_fires_nothing() {
        assert!(approval_trigger_events(WorkflowOutcome::Rejected).is_empty());
    }
}
