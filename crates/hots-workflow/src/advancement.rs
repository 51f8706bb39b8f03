//! Workflow advancement logic.
//!
//! Pure functions over a ticket's approval event list. The "active level" is
//! never stored; it is derived on demand from the lowest order index that
//! still has a waiting event, so it cannot drift from the event rows.

use uuid::Uuid;

use hots_db::models::{ApprovalEvent, EventStatus, Ticket};

use crate::error::{Result, WorkflowError};

/// Aggregate state of a ticket's approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// At least one event is still waiting.
    AwaitingApproval,
    /// Every event is approved. A ticket with zero events also lands here:
    /// no approvals were required.
    Approved,
    /// At least one event was rejected. Rejection short-circuits regardless
    /// of other pending events.
    Rejected,
}

/// The lowest order index with a waiting event, or `None` when every event
/// is decided (or the list is empty).
#[must_use]
pub fn active_level(events: &[ApprovalEvent]) -> Option<i32> {
    events
        .iter()
        .filter(|e| e.status == EventStatus::Waiting)
        .map(|e| e.step_order)
        .min()
}

/// Derive the workflow outcome from the full event list.
///
/// Idempotent by construction: evaluating an already-terminal event list
/// yields the same terminal outcome.
#[must_use]
pub fn outcome(events: &[ApprovalEvent]) -> WorkflowOutcome {
    if events.iter().any(|e| e.status == EventStatus::Rejected) {
        WorkflowOutcome::Rejected
    } else if events.iter().any(|e| e.status == EventStatus::Waiting) {
        WorkflowOutcome::AwaitingApproval
    } else {
        WorkflowOutcome::Approved
    }
}

/// Verify that a decision may be applied: the ticket still accepts
/// decisions, the claimed level is the active one, and the acting user owns
/// a waiting event at that level.
///
/// This is the authorization check; the single-waiting-row update in the
/// event store remains the concurrency backstop underneath it.
pub fn authorize_decision(
    ticket: &Ticket,
    events: &[ApprovalEvent],
    approver_id: Uuid,
    step_order: i32,
) -> Result<()> {
    if !ticket.status.is_awaiting_approval() {
        return Err(WorkflowError::TicketNotAwaitingApproval(ticket.id));
    }

    let active = active_level(events);
    if active != Some(step_order) {
        return Err(WorkflowError::StepNotActive {
            requested: step_order,
            active,
        });
    }

    let owns_waiting = events.iter().any(|e| {
        e.approver_id == approver_id
            && e.step_order == step_order
            && e.status == EventStatus::Waiting
    });
    if !owns_waiting {
        return Err(WorkflowError::NotDesignatedApprover { step_order });
    }

    Ok(())
}

/// Whether every event at the given level is resolved.
#[must_use]
pub fn level_resolved(events: &[ApprovalEvent], step_order: i32) -> bool {
    events
        .iter()
        .filter(|e| e.step_order == step_order)
        .all(|e| e.status != EventStatus::Waiting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(step_order: i32, status: EventStatus) -> ApprovalEvent {
        ApprovalEvent {
            id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            approver_id: Uuid::new_v4(),
            step_order,
            status,
            note: None,
            decided_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_level_is_lowest_waiting_order() {
        let events = vec![
            event(1, EventStatus::Approved),
            event(2, EventStatus::Waiting),
            event(3, EventStatus::Waiting),
        ];
        assert_eq!(active_level(&events), Some(2));
    }

    #[test]
    fn test_active_level_none_when_all_decided() {
        let events = vec![
            event(1, EventStatus::Approved),
            event(2, EventStatus::Approved),
        ];
        assert_eq!(active_level(&events), None);
        assert_eq!(active_level(&[]), None);
    }

    #[test]
    fn test_outcome_empty_list_is_approved() {
        // Zero events means no approvals were required.
        assert_eq!(outcome(&[]), WorkflowOutcome::Approved);
    }

    #[test]
    fn test_outcome_rejection_short_circuits() {
        let events = vec![
            event(1, EventStatus::Approved),
            event(2, EventStatus::Rejected),
            event(2, EventStatus::Waiting),
            event(3, EventStatus::Waiting),
        ];
        assert_eq!(outcome(&events), WorkflowOutcome::Rejected);
    }

    #[test]
    fn test_outcome_idempotent_after_terminal_state() {
        let events = vec![event(1, EventStatus::Rejected)];
        assert_eq!(outcome(&events), WorkflowOutcome::Rejected);
        assert_eq!(outcome(&events), WorkflowOutcome::Rejected);

        let approved = vec![event(1, EventStatus::Approved)];
        assert_eq!(outcome(&approved), WorkflowOutcome::Approved);
        assert_eq!(outcome(&approved), WorkflowOutcome::Approved);
    }

    #[test]
    fn test_level_resolved() {
        let events = vec![
            event(1, EventStatus::Approved),
            event(2, EventStatus::Approved),
            event(2, EventStatus::Waiting),
        ];
        assert!(level_resolved(&events, 1));
        assert!(!level_resolved(&events, 2));
        // A level with no events is trivially resolved.
        assert!(level_resolved(&events, 3));
    }

    // Two sequential levels: a single approver at level 1 and a two-person
    // parallel level 2. The ticket completes only when all three approve.
    #[test]
    fn test_sequential_levels_parallel_within_level() {
        let a = event(1, EventStatus::Waiting);
        let b = event(2, EventStatus::Waiting);
        let c = event(2, EventStatus::Waiting);
        let mut events = vec![a, b, c];

        assert_eq!(active_level(&events), Some(1));
        assert_eq!(outcome(&events), WorkflowOutcome::AwaitingApproval);

        // A approves: level 2 becomes active.
        events[0].status = EventStatus::Approved;
        assert_eq!(active_level(&events), Some(2));
        assert_eq!(outcome(&events), WorkflowOutcome::AwaitingApproval);

        // B approves: C still holds level 2 open.
        events[1].status = EventStatus::Approved;
        assert_eq!(active_level(&events), Some(2));
        assert_eq!(outcome(&events), WorkflowOutcome::AwaitingApproval);

        // C approves: workflow complete.
        events[2].status = EventStatus::Approved;
        assert_eq!(active_level(&events), None);
        assert_eq!(outcome(&events), WorkflowOutcome::Approved);
    }

    fn ticket(status: hots_db::models::TicketStatus) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            status,
            assigned_team_id: None,
            assigned_user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn owned_event(approver_id: Uuid, step_order: i32, status: EventStatus) -> ApprovalEvent {
        let mut e = event(step_order, status);
        e.approver_id = approver_id;
        e
    }

    #[test]
    fn test_authorize_decision_on_active_level() {
        use hots_db::models::TicketStatus;

        let approver = Uuid::new_v4();
        let events = vec![owned_event(approver, 1, EventStatus::Waiting)];

        let t = ticket(TicketStatus::New);
        assert!(authorize_decision(&t, &events, approver, 1).is_ok());
    }

    #[test]
    fn test_authorize_decision_rejects_terminal_ticket() {
        use hots_db::models::TicketStatus;

        let approver = Uuid::new_v4();
        let events = vec![owned_event(approver, 1, EventStatus::Waiting)];

        for status in [TicketStatus::Rejected, TicketStatus::Approved, TicketStatus::Closed] {
            let t = ticket(status);
            let err = authorize_decision(&t, &events, approver, 1).unwrap_err();
            assert!(matches!(err, WorkflowError::TicketNotAwaitingApproval(_)));
        }
    }

    #[test]
    fn test_authorize_decision_rejects_inactive_level() {
        use hots_db::models::TicketStatus;

        let approver = Uuid::new_v4();
        let events = vec![
            event(1, EventStatus::Waiting),
            owned_event(approver, 2, EventStatus::Waiting),
        ];

        // Level 1 still holds a waiting event, so level 2 is not decidable.
        let t = ticket(TicketStatus::New);
        let err = authorize_decision(&t, &events, approver, 2).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::StepNotActive {
                requested: 2,
                active: Some(1)
            }
        ));
    }

    #[test]
    fn test_authorize_decision_rejects_non_designated_approver() {
        use hots_db::models::TicketStatus;

        let events = vec![event(1, EventStatus::Waiting)];

        let t = ticket(TicketStatus::New);
        let err = authorize_decision(&t, &events, Uuid::new_v4(), 1).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::NotDesignatedApprover { step_order: 1 }
        ));
    }

    #[test]
    fn test_authorize_decision_rejects_double_decision() {
        use hots_db::models::TicketStatus;

        let approver = Uuid::new_v4();
        // The approver already decided; a peer holds the level open.
        let events = vec![
            owned_event(approver, 1, EventStatus::Approved),
            event(1, EventStatus::Waiting),
        ];

        let t = ticket(TicketStatus::InProgress);
        let err = authorize_decision(&t, &events, approver, 1).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::NotDesignatedApprover { step_order: 1 }
        ));
    }

    // Same setup, but B rejects at level 2 after A approved level 1.
    #[test]
    fn test_rejection_at_second_level_halts_workflow() {
        let mut events = vec![
            event(1, EventStatus::Approved),
            event(2, EventStatus::Waiting),
            event(2, EventStatus::Waiting),
        ];

        events[1].status = EventStatus::Rejected;
        assert_eq!(outcome(&events), WorkflowOutcome::Rejected);

        // C's pending event does not change the terminal outcome.
        assert_eq!(active_level(&events), Some(2));
        assert_eq!(outcome(&events), WorkflowOutcome::Rejected);
    }
}
