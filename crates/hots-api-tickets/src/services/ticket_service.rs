//! Ticket lifecycle service.
//!
//! Owns ticket submission, the read paths, and the fulfillment-side status
//! transitions. A ticket and its materialized approval events are created in
//! one transaction; lifecycle events are published only after the commit.

use sqlx::PgPool;
use uuid::Uuid;

use hots_db::models::{
    ApprovalEvent, CreateApprovalEvent, CreateTicket, CreateTicketDetail, ServiceItem, Ticket,
    TicketDetail, TicketFilter, TicketStatus, TriggerEvent, User, WorkflowGroup, WorkflowStep,
    MAX_DETAIL_SLOTS,
};
use hots_workflow::{
    ApproverResolver, Result, ResolverContext, TicketEvent, TicketEventPublisher, WorkflowError,
};

use crate::models::TicketDetailInput;

/// A ticket together with its details and approval events.
#[derive(Debug, Clone)]
pub struct TicketAggregate {
    pub ticket: Ticket,
    pub details: Vec<TicketDetail>,
    pub events: Vec<ApprovalEvent>,
}

/// The outcome of a ticket submission.
#[derive(Debug, Clone)]
pub struct CreatedTicket {
    pub ticket: Ticket,
    pub details: Vec<TicketDetail>,
    pub events: Vec<ApprovalEvent>,
    /// True when the workflow resolved to zero approvers and the ticket was
    /// approved at creation.
    pub auto_approved: bool,
}

/// Service for ticket submission and lifecycle.
pub struct TicketService {
    pool: PgPool,
    resolver: ApproverResolver,
    publisher: TicketEventPublisher,
}

impl TicketService {
    /// Create a new ticket service.
    #[must_use]
    pub fn new(pool: PgPool, publisher: TicketEventPublisher) -> Self {
        let resolver = ApproverResolver::new(pool.clone());
        Self {
            pool,
            resolver,
            publisher,
        }
    }

    /// Submit a new ticket.
    ///
    /// Resolves the service's workflow steps to concrete approvers, then
    /// inserts the ticket, its detail slots, and the full approval event set
    /// in one transaction. When the workflow resolves to no approvers the
    /// ticket is approved immediately, with a warning for operators.
    pub async fn create_ticket(
        &self,
        creator_id: Uuid,
        service_id: Uuid,
        details: &[TicketDetailInput],
    ) -> Result<CreatedTicket> {
        if details.len() > MAX_DETAIL_SLOTS {
            return Err(WorkflowError::DetailSlotsExceeded {
                got: details.len(),
                max: MAX_DETAIL_SLOTS,
            });
        }

        let creator = User::find_by_id(&self.pool, creator_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(WorkflowError::UserNotFound(creator_id))?;

        let service = ServiceItem::find_by_id(&self.pool, service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(WorkflowError::ServiceNotFound(service_id))?;

        let steps = self.workflow_steps_for(&service).await?;
        let ctx = ResolverContext { creator };
        let resolved = self.resolver.resolve_steps(&steps, &ctx).await;

        let detail_inputs: Vec<CreateTicketDetail> = details
            .iter()
            .map(|d| CreateTicketDetail {
                label: d.label.clone(),
                value: d.value.clone(),
            })
            .collect();
        let event_inputs: Vec<CreateApprovalEvent> = resolved
            .iter()
            .map(|r| CreateApprovalEvent {
                approver_id: r.approver_id,
                step_order: r.step_order,
            })
            .collect();

        let mut tx = self.pool.begin().await?;

        let mut ticket = Ticket::create(
            &mut *tx,
            CreateTicket {
                creator_id,
                service_id,
                assigned_team_id: service.fulfillment_team_id,
                assigned_user_id: None,
            },
        )
        .await?;

        let created_details =
            TicketDetail::create_batch(&mut *tx, ticket.id, &detail_inputs).await?;
        let created_events =
            ApprovalEvent::create_batch(&mut *tx, ticket.id, &event_inputs).await?;

        let auto_approved = created_events.is_empty();
        if auto_approved {
            ticket = Ticket::update_status(&mut *tx, ticket.id, TicketStatus::Approved)
                .await?
                .ok_or(WorkflowError::TicketNotFound(ticket.id))?;
        }

        tx.commit().await?;

        if auto_approved {
            tracing::warn!(
                ticket_id = %ticket.id,
                service_id = %service_id,
                "Workflow resolved to no approvers; ticket approved at creation"
            );
        }

        tracing::info!(
            ticket_id = %ticket.id,
            creator_id = %creator_id,
            service_id = %service_id,
            approval_events = created_events.len(),
            "Ticket created"
        );

        self.publisher.publish(TicketEvent::new(
            TriggerEvent::OnCreated,
            ticket.id,
            service_id,
            Some(creator_id),
            serde_json::json!({ "approval_events": created_events.len() }),
        ));
        if auto_approved {
            self.publisher.publish(TicketEvent::new(
                TriggerEvent::OnApproved,
                ticket.id,
                service_id,
                None,
                serde_json::json!({ "auto_approved": true }),
            ));
            self.publisher.publish(TicketEvent::new(
                TriggerEvent::OnFinalApproved,
                ticket.id,
                service_id,
                None,
                serde_json::json!({ "auto_approved": true }),
            ));
        }

        Ok(CreatedTicket {
            ticket,
            details: created_details,
            events: created_events,
            auto_approved,
        })
    }

    /// Load the workflow steps behind a service, if any. An inactive group
    /// disables approvals the same way an unattached one does.
    async fn workflow_steps_for(&self, service: &ServiceItem) -> Result<Vec<WorkflowStep>> {
        let Some(group_id) = service.workflow_group_id else {
            return Ok(Vec::new());
        };

        let group = WorkflowGroup::find_by_id(&self.pool, group_id).await?;
        match group {
            Some(group) if group.is_active => {
                Ok(WorkflowStep::find_by_group(&self.pool, group_id).await?)
            }
            _ => {
                tracing::warn!(
                    service_id = %service.id,
                    workflow_group_id = %group_id,
                    "Service references a missing or inactive workflow group; no approvals required"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Fetch a ticket with its details and approval events.
    pub async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketAggregate> {
        let ticket = Ticket::find_by_id(&self.pool, ticket_id)
            .await?
            .ok_or(WorkflowError::TicketNotFound(ticket_id))?;
        let details = TicketDetail::find_by_ticket(&self.pool, ticket_id).await?;
        let events = ApprovalEvent::find_by_ticket(&self.pool, ticket_id).await?;

        Ok(TicketAggregate {
            ticket,
            details,
            events,
        })
    }

    /// List tickets matching the filter, with a total count.
    pub async fn list_tickets(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TicketAggregate>, i64)> {
        let tickets = Ticket::list(&self.pool, filter, limit, offset).await?;
        let total = Ticket::count(&self.pool, filter).await?;

        let mut aggregates = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let details = TicketDetail::find_by_ticket(&self.pool, ticket.id).await?;
            let events = ApprovalEvent::find_by_ticket(&self.pool, ticket.id).await?;
            aggregates.push(TicketAggregate {
                ticket,
                details,
                events,
            });
        }

        Ok((aggregates, total))
    }

    /// Apply a fulfillment-side status transition (`approved -> fulfilled`,
    /// `fulfilled -> closed`). Approval-side transitions are owned by the
    /// decision flow and rejected here.
    pub async fn update_status(&self, ticket_id: Uuid, next: TicketStatus) -> Result<Ticket> {
        let mut tx = self.pool.begin().await?;

        let ticket = Ticket::find_by_id_for_update(&mut *tx, ticket_id)
            .await?
            .ok_or(WorkflowError::TicketNotFound(ticket_id))?;

        if !ticket.status.can_transition_to(next) {
            return Err(WorkflowError::InvalidStatusTransition {
                from: ticket.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let updated = Ticket::update_status(&mut *tx, ticket_id, next)
            .await?
            .ok_or(WorkflowError::TicketNotFound(ticket_id))?;

        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_id,
            from = ?ticket.status,
            to = ?next,
            "Ticket status updated"
        );

        Ok(updated)
    }
}
