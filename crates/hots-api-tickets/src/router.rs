//! Router assembly for the ticket API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

use hots_workflow::TicketEventPublisher;

use crate::handlers::{approvals, tickets, workflow_groups};
use crate::services::{ApprovalService, TicketService, WorkflowGroupService};

/// Shared state for ticket API handlers.
#[derive(Clone)]
pub struct TicketsState {
    pub pool: PgPool,
    pub tickets: Arc<TicketService>,
    pub approvals: Arc<ApprovalService>,
    pub workflow_groups: Arc<WorkflowGroupService>,
}

impl TicketsState {
    /// Build the state with all services wired to the pool and publisher.
    #[must_use]
    pub fn new(pool: PgPool, publisher: TicketEventPublisher) -> Self {
        Self {
            tickets: Arc::new(TicketService::new(pool.clone(), publisher.clone())),
            approvals: Arc::new(ApprovalService::new(pool.clone(), publisher)),
            workflow_groups: Arc::new(WorkflowGroupService::new(pool.clone())),
            pool,
        }
    }
}

/// Build the ticket API router. Callers layer authentication middleware on
/// top.
pub fn tickets_router(state: TicketsState) -> Router {
    Router::new()
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route("/tickets/:id", get(tickets::get_ticket))
        .route("/tickets/:id/status", post(tickets::update_ticket_status))
        .route("/tickets/:id/approve", post(approvals::approve_ticket))
        .route("/tickets/:id/reject", post(approvals::reject_ticket))
        .route("/my-approvals", get(approvals::list_my_approvals))
        .route(
            "/workflow-groups",
            post(workflow_groups::create_workflow_group)
                .get(workflow_groups::list_workflow_groups),
        )
        .route(
            "/workflow-groups/:id",
            get(workflow_groups::get_workflow_group)
                .put(workflow_groups::update_workflow_group)
                .delete(workflow_groups::delete_workflow_group),
        )
        .with_state(state)
}
