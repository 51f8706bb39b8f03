//! Workflow step model.
//!
//! Configuration describing how to resolve approvers at one order index of a
//! workflow group. Steps are configuration, not per-ticket state: editing
//! them affects only tickets created afterwards, because approval events are
//! materialized from the steps at ticket-creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How approvers are resolved for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "approver_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApproverKind {
    /// All active users holding the referenced role.
    Role,
    /// All active members of the referenced team.
    Team,
    /// The referenced user, verbatim.
    SpecificUser,
    /// The ticket creator's superior.
    Superior,
    /// The leader of the ticket creator's team.
    TeamLeader,
    /// The head of the ticket creator's division.
    DepartmentHead,
    /// A stored single-column query returning approver user ids.
    CustomSql,
}

impl ApproverKind {
    /// Whether this kind requires a `target_id` reference.
    #[must_use]
    pub fn requires_target(self) -> bool {
        matches!(self, Self::Role | Self::Team | Self::SpecificUser)
    }

    /// Whether this kind is derived from the ticket creator's profile rather
    /// than from static step configuration.
    #[must_use]
    pub fn is_creator_derived(self) -> bool {
        matches!(self, Self::Superior | Self::TeamLeader | Self::DepartmentHead)
    }
}

/// A single approval step within a workflow group.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Unique identifier.
    pub id: Uuid,

    /// The workflow group this step belongs to.
    pub workflow_group_id: Uuid,

    /// Approval level (1, 2, 3...). Steps may share a level.
    pub step_order: i32,

    /// How approvers are resolved.
    pub approver_kind: ApproverKind,

    /// Role, team, or user reference, depending on the kind.
    pub target_id: Option<Uuid>,

    /// Stored query text (only for `CustomSql`).
    pub custom_query: Option<String>,

    /// When set, replaces whatever the step resolves to.
    pub override_user_id: Option<Uuid>,

    /// When the step was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a workflow step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowStep {
    pub step_order: i32,
    pub approver_kind: ApproverKind,
    pub target_id: Option<Uuid>,
    pub custom_query: Option<String>,
    pub override_user_id: Option<Uuid>,
}

impl WorkflowStep {
    /// Find all steps for a workflow group, ordered by level.
    pub async fn find_by_group(
        executor: impl sqlx::PgExecutor<'_>,
        workflow_group_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM workflow_steps
            WHERE workflow_group_id = $1
            ORDER BY step_order ASC
            ",
        )
        .bind(workflow_group_id)
        .fetch_all(executor)
        .await
    }

    /// Create a new step.
    pub async fn create(
        executor: impl sqlx::PgExecutor<'_>,
        workflow_group_id: Uuid,
        input: &CreateWorkflowStep,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO workflow_steps
                (workflow_group_id, step_order, approver_kind, target_id, custom_query, override_user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(workflow_group_id)
        .bind(input.step_order)
        .bind(input.approver_kind)
        .bind(input.target_id)
        .bind(input.custom_query.as_deref())
        .bind(input.override_user_id)
        .fetch_one(executor)
        .await
    }

    /// Create multiple steps in sequence.
    pub async fn create_batch(
        conn: &mut sqlx::PgConnection,
        workflow_group_id: Uuid,
        steps: &[CreateWorkflowStep],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut created = Vec::with_capacity(steps.len());
        for step in steps {
            created.push(Self::create(&mut *conn, workflow_group_id, step).await?);
        }
        Ok(created)
    }

    /// Delete all steps for a workflow group.
    pub async fn delete_by_group(
        executor: impl sqlx::PgExecutor<'_>,
        workflow_group_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            DELETE FROM workflow_steps
            WHERE workflow_group_id = $1
            ",
        )
        .bind(workflow_group_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Validate that a step's references are consistent with its kind.
#[must_use]
pub fn validate_step(
    kind: ApproverKind,
    target_id: Option<Uuid>,
    custom_query: Option<&str>,
) -> bool {
    match kind {
        ApproverKind::Role | ApproverKind::Team | ApproverKind::SpecificUser => target_id.is_some(),
        ApproverKind::CustomSql => custom_query.is_some_and(|q| !q.trim().is_empty()),
        ApproverKind::Superior | ApproverKind::TeamLeader | ApproverKind::DepartmentHead => {
            target_id.is_none() && custom_query.is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ApproverKind::DepartmentHead).unwrap();
        assert_eq!(json, "\"department_head\"");

        let restored: ApproverKind = serde_json::from_str("\"custom_sql\"").unwrap();
        assert_eq!(restored, ApproverKind::CustomSql);
    }

    #[test]
    fn test_requires_target() {
        assert!(ApproverKind::Role.requires_target());
        assert!(ApproverKind::Team.requires_target());
        assert!(ApproverKind::SpecificUser.requires_target());
        assert!(!ApproverKind::Superior.requires_target());
        assert!(!ApproverKind::CustomSql.requires_target());
    }

    #[test]
    fn test_validate_targeted_kinds() {
        assert!(validate_step(ApproverKind::Role, Some(Uuid::new_v4()), None));
        assert!(!validate_step(ApproverKind::Role, None, None));
        assert!(!validate_step(ApproverKind::SpecificUser, None, None));
    }

    #[test]
    fn test_validate_custom_sql() {
        assert!(validate_step(
            ApproverKind::CustomSql,
            None,
            Some("SELECT approver_id FROM delegations WHERE user_id = $1"),
        ));
        assert!(!validate_step(ApproverKind::CustomSql, None, Some("   ")));
        assert!(!validate_step(ApproverKind::CustomSql, None, None));
    }

    #[test]
    fn test_validate_creator_derived_kinds() {
        assert!(validate_step(ApproverKind::Superior, None, None));
        assert!(validate_step(ApproverKind::TeamLeader, None, None));
        assert!(!validate_step(
            ApproverKind::DepartmentHead,
            Some(Uuid::new_v4()),
            None
        ));
    }
}
