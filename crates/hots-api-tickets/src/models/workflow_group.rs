//! Request and response models for workflow group administration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use hots_db::models::{ApproverKind, WorkflowGroup, WorkflowStep};

/// One step of a workflow group definition.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StepInput {
    /// Approval level (1, 2, 3...). Steps may share a level.
    #[validate(range(min = 1, max = 100))]
    pub step_order: i32,

    /// How approvers are resolved.
    pub approver_kind: ApproverKind,

    /// Role, team, or user reference, depending on the kind.
    pub target_id: Option<Uuid>,

    /// Stored query text (only for `custom_sql`).
    #[validate(length(max = 4000))]
    pub custom_query: Option<String>,

    /// When set, replaces whatever the step resolves to.
    pub override_user_id: Option<Uuid>,
}

/// Request to create a workflow group with its steps.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWorkflowGroupRequest {
    /// Display name, unique.
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    /// Optional description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Ordered step definitions.
    #[validate(nested)]
    pub steps: Vec<StepInput>,
}

/// Request to update a workflow group. When `steps` is present the existing
/// step set is replaced; already-created tickets keep their materialized
/// events.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkflowGroupRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub is_active: Option<bool>,

    #[validate(nested)]
    pub steps: Option<Vec<StepInput>>,
}

/// A workflow group with its steps.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowGroupResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub steps: Vec<StepInput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowGroupResponse {
    /// Assemble the response from the persisted group and steps.
    #[must_use]
    pub fn assemble(group: WorkflowGroup, steps: Vec<WorkflowStep>) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            is_active: group.is_active,
            steps: steps
                .into_iter()
                .map(|s| StepInput {
                    step_order: s.step_order,
                    approver_kind: s.approver_kind,
                    target_id: s.target_id,
                    custom_query: s.custom_query,
                    override_user_id: s.override_user_id,
                })
                .collect(),
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// Paginated workflow group list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowGroupListResponse {
    pub items: Vec<WorkflowGroupResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
