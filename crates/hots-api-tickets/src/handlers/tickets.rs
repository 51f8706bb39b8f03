//! Ticket submission, read, and fulfillment handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use hots_db::models::TicketFilter;

use crate::error::ApiResult;
use crate::identity::RequestIdentity;
use crate::models::{
    CreateTicketRequest, ListTicketsQuery, TicketListResponse, TicketResponse,
    UpdateTicketStatusRequest,
};
use crate::router::TicketsState;

fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (limit.unwrap_or(50).clamp(1, 100), offset.unwrap_or(0).max(0))
}

/// Submit a new ticket.
#[utoipa::path(
    post,
    path = "/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<TicketsState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketResponse>)> {
    request.validate()?;

    let created = state
        .tickets
        .create_ticket(identity.user_id, request.service_id, &request.details)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketResponse::assemble(
            created.ticket,
            created.details,
            created.events,
        )),
    ))
}

/// List tickets.
#[utoipa::path(
    get,
    path = "/tickets",
    params(ListTicketsQuery),
    responses(
        (status = 200, description = "Ticket list", body = TicketListResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<TicketsState>,
    Query(query): Query<ListTicketsQuery>,
) -> ApiResult<Json<TicketListResponse>> {
    let (limit, offset) = page(query.limit, query.offset);
    let filter = TicketFilter {
        status: query.status,
        creator_id: query.creator_id,
    };

    let (aggregates, total) = state.tickets.list_tickets(&filter, limit, offset).await?;

    Ok(Json(TicketListResponse {
        items: aggregates
            .into_iter()
            .map(|a| TicketResponse::assemble(a.ticket, a.details, a.events))
            .collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a ticket with its details and approval events.
#[utoipa::path(
    get,
    path = "/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket detail", body = TicketResponse),
        (status = 404, description = "Ticket not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TicketResponse>> {
    let aggregate = state.tickets.get_ticket(id).await?;

    Ok(Json(TicketResponse::assemble(
        aggregate.ticket,
        aggregate.details,
        aggregate.events,
    )))
}

/// Move an approved ticket through fulfillment.
#[utoipa::path(
    post,
    path = "/tickets/{id}/status",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateTicketStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = TicketResponse),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Invalid status transition"),
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn update_ticket_status(
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTicketStatusRequest>,
) -> ApiResult<Json<TicketResponse>> {
    state.tickets.update_status(id, request.status).await?;
    let aggregate = state.tickets.get_ticket(id).await?;

    Ok(Json(TicketResponse::assemble(
        aggregate.ticket,
        aggregate.details,
        aggregate.events,
    )))
}
