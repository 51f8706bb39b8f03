//! Approval decision handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiResult;
use crate::identity::RequestIdentity;
use crate::models::{
    ApproveTicketRequest, DecisionResponse, ListPendingApprovalsQuery, PendingApprovalItem,
    PendingApprovalListResponse, RejectTicketRequest,
};
use crate::router::TicketsState;

/// Approve a ticket at the active level.
#[utoipa::path(
    post,
    path = "/tickets/{id}/approve",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = ApproveTicketRequest,
    responses(
        (status = 200, description = "Approval recorded", body = DecisionResponse),
        (status = 403, description = "Not a designated approver"),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket not awaiting approval at this level"),
    ),
    security(("bearer_auth" = [])),
    tag = "approvals"
)]
pub async fn approve_ticket(
    State(state): State<TicketsState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveTicketRequest>,
) -> ApiResult<Json<DecisionResponse>> {
    request.validate()?;

    let result = state
        .approvals
        .approve(
            id,
            identity.user_id,
            request.step_order,
            request.note.as_deref(),
        )
        .await?;

    let message = if result.finally_approved {
        "Ticket fully approved".to_string()
    } else {
        format!("Approval recorded at step {}", request.step_order)
    };

    Ok(Json(DecisionResponse {
        ticket_id: id,
        new_status: result.ticket.status,
        decision: result.decision,
        finally_approved: result.finally_approved,
        message,
    }))
}

/// Reject a ticket at the active level. The remark is mandatory.
#[utoipa::path(
    post,
    path = "/tickets/{id}/reject",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = RejectTicketRequest,
    responses(
        (status = 200, description = "Rejection recorded", body = DecisionResponse),
        (status = 400, description = "Missing rejection remark"),
        (status = 403, description = "Not a designated approver"),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket not awaiting approval at this level"),
    ),
    security(("bearer_auth" = [])),
    tag = "approvals"
)]
pub async fn reject_ticket(
    State(state): State<TicketsState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectTicketRequest>,
) -> ApiResult<Json<DecisionResponse>> {
    request.validate()?;

    let result = state
        .approvals
        .reject(id, identity.user_id, request.step_order, &request.remark)
        .await?;

    Ok(Json(DecisionResponse {
        ticket_id: id,
        new_status: result.ticket.status,
        decision: result.decision,
        finally_approved: false,
        message: "Ticket rejected".to_string(),
    }))
}

/// The acting user's pending approval queue.
#[utoipa::path(
    get,
    path = "/my-approvals",
    params(ListPendingApprovalsQuery),
    responses(
        (status = 200, description = "Pending approvals", body = PendingApprovalListResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "approvals"
)]
pub async fn list_my_approvals(
    State(state): State<TicketsState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<ListPendingApprovalsQuery>,
) -> ApiResult<Json<PendingApprovalListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let (items, total) = state
        .approvals
        .pending_for_user(identity.user_id, limit, offset)
        .await?;

    Ok(Json(PendingApprovalListResponse {
        items: items
            .into_iter()
            .map(|p| PendingApprovalItem {
                ticket_id: p.ticket_id,
                creator_id: p.creator_id,
                service_id: p.service_id,
                step_order: p.step_order,
                submitted_at: p.submitted_at,
            })
            .collect(),
        total,
        limit,
        offset,
    }))
}
