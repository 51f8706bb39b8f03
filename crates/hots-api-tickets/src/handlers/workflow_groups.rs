//! Workflow group administration handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{
    CreateWorkflowGroupRequest, UpdateWorkflowGroupRequest, WorkflowGroupListResponse,
    WorkflowGroupResponse,
};
use crate::router::TicketsState;

/// Query parameters for listing workflow groups.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListWorkflowGroupsQuery {
    /// Maximum number of results (default: 50, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,

    /// Number of results to skip.
    #[param(minimum = 0)]
    pub offset: Option<i64>,
}

/// Create a workflow group with its steps.
#[utoipa::path(
    post,
    path = "/workflow-groups",
    request_body = CreateWorkflowGroupRequest,
    responses(
        (status = 201, description = "Workflow group created", body = WorkflowGroupResponse),
        (status = 400, description = "Invalid step configuration"),
        (status = 409, description = "Name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "workflow-groups"
)]
pub async fn create_workflow_group(
    State(state): State<TicketsState>,
    Json(request): Json<CreateWorkflowGroupRequest>,
) -> ApiResult<(StatusCode, Json<WorkflowGroupResponse>)> {
    request.validate()?;

    let (group, steps) = state.workflow_groups.create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(WorkflowGroupResponse::assemble(group, steps)),
    ))
}

/// List workflow groups.
#[utoipa::path(
    get,
    path = "/workflow-groups",
    params(ListWorkflowGroupsQuery),
    responses(
        (status = 200, description = "Workflow group list", body = WorkflowGroupListResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "workflow-groups"
)]
pub async fn list_workflow_groups(
    State(state): State<TicketsState>,
    Query(query): Query<ListWorkflowGroupsQuery>,
) -> ApiResult<Json<WorkflowGroupListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let (items, total) = state.workflow_groups.list(limit, offset).await?;

    Ok(Json(WorkflowGroupListResponse {
        items: items
            .into_iter()
            .map(|(group, steps)| WorkflowGroupResponse::assemble(group, steps))
            .collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a workflow group with its steps.
#[utoipa::path(
    get,
    path = "/workflow-groups/{id}",
    params(("id" = Uuid, Path, description = "Workflow group ID")),
    responses(
        (status = 200, description = "Workflow group", body = WorkflowGroupResponse),
        (status = 404, description = "Workflow group not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "workflow-groups"
)]
pub async fn get_workflow_group(
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WorkflowGroupResponse>> {
    let (group, steps) = state.workflow_groups.get(id).await?;

    Ok(Json(WorkflowGroupResponse::assemble(group, steps)))
}

/// Update a workflow group, optionally replacing its step set.
#[utoipa::path(
    put,
    path = "/workflow-groups/{id}",
    params(("id" = Uuid, Path, description = "Workflow group ID")),
    request_body = UpdateWorkflowGroupRequest,
    responses(
        (status = 200, description = "Workflow group updated", body = WorkflowGroupResponse),
        (status = 404, description = "Workflow group not found"),
        (status = 409, description = "Name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "workflow-groups"
)]
pub async fn update_workflow_group(
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWorkflowGroupRequest>,
) -> ApiResult<Json<WorkflowGroupResponse>> {
    request.validate()?;

    let (group, steps) = state.workflow_groups.update(id, &request).await?;

    Ok(Json(WorkflowGroupResponse::assemble(group, steps)))
}

/// Delete a workflow group. Refused while services reference it.
#[utoipa::path(
    delete,
    path = "/workflow-groups/{id}",
    params(("id" = Uuid, Path, description = "Workflow group ID")),
    responses(
        (status = 204, description = "Workflow group deleted"),
        (status = 404, description = "Workflow group not found"),
        (status = 409, description = "Workflow group still attached to services"),
    ),
    security(("bearer_auth" = [])),
    tag = "workflow-groups"
)]
pub async fn delete_workflow_group(
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.workflow_groups.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
