//! Workflow group model.
//!
//! A named, ordered set of workflow steps attached to catalog services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named approval workflow.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WorkflowGroup {
    /// Unique identifier.
    pub id: Uuid,

    /// Display name, unique.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Whether the group can be attached to services.
    pub is_active: bool,

    /// When the group was created.
    pub created_at: DateTime<Utc>,

    /// When the group was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a workflow group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowGroup {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a workflow group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWorkflowGroup {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl WorkflowGroup {
    /// Find a workflow group by ID.
    pub async fn find_by_id(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM workflow_groups
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Find a workflow group by name.
    pub async fn find_by_name(
        executor: impl sqlx::PgExecutor<'_>,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM workflow_groups
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// List workflow groups, newest first.
    pub async fn list(
        pool: &sqlx::PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM workflow_groups
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count all workflow groups.
    pub async fn count(pool: &sqlx::PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM workflow_groups")
            .fetch_one(pool)
            .await
    }

    /// Create a new workflow group.
    pub async fn create(
        executor: impl sqlx::PgExecutor<'_>,
        input: &CreateWorkflowGroup,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO workflow_groups (name, description)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(input.description.as_deref())
        .fetch_one(executor)
        .await
    }

    /// Apply a partial update.
    pub async fn update(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
        input: &UpdateWorkflowGroup,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE workflow_groups
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.is_active)
        .fetch_optional(executor)
        .await
    }

    /// Delete a workflow group. Steps cascade.
    pub async fn delete(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            DELETE FROM workflow_groups
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count services referencing this workflow group.
    pub async fn count_attached_services(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM service_items
            WHERE workflow_group_id = $1
            ",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }
}
