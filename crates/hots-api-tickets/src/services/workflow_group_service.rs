//! Workflow group administration service.
//!
//! CRUD over workflow groups and their step definitions. Step edits only
//! affect tickets created afterwards: existing tickets keep the approval
//! events materialized at their creation.

use sqlx::PgPool;
use uuid::Uuid;

use hots_db::models::{
    validate_step, CreateWorkflowGroup, CreateWorkflowStep, UpdateWorkflowGroup, WorkflowGroup,
    WorkflowStep,
};
use hots_workflow::{Result, WorkflowError};

use crate::models::{CreateWorkflowGroupRequest, StepInput, UpdateWorkflowGroupRequest};

/// Maximum number of steps a workflow group may define.
pub const MAX_WORKFLOW_STEPS: usize = 10;

/// Service for workflow group administration.
pub struct WorkflowGroupService {
    pool: PgPool,
}

impl WorkflowGroupService {
    /// Create a new workflow group service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a workflow group with its steps.
    pub async fn create(
        &self,
        request: &CreateWorkflowGroupRequest,
    ) -> Result<(WorkflowGroup, Vec<WorkflowStep>)> {
        let step_inputs = validated_steps(&request.steps)?;

        if WorkflowGroup::find_by_name(&self.pool, &request.name)
            .await?
            .is_some()
        {
            return Err(WorkflowError::WorkflowGroupNameExists(request.name.clone()));
        }

        let mut tx = self.pool.begin().await?;

        let group = WorkflowGroup::create(
            &mut *tx,
            &CreateWorkflowGroup {
                name: request.name.clone(),
                description: request.description.clone(),
            },
        )
        .await?;
        let steps = WorkflowStep::create_batch(&mut *tx, group.id, &step_inputs).await?;

        tx.commit().await?;

        tracing::info!(
            workflow_group_id = %group.id,
            name = %group.name,
            steps = steps.len(),
            "Workflow group created"
        );

        Ok((group, steps))
    }

    /// Fetch a workflow group with its steps.
    pub async fn get(&self, id: Uuid) -> Result<(WorkflowGroup, Vec<WorkflowStep>)> {
        let group = WorkflowGroup::find_by_id(&self.pool, id)
            .await?
            .ok_or(WorkflowError::WorkflowGroupNotFound(id))?;
        let steps = WorkflowStep::find_by_group(&self.pool, id).await?;

        Ok((group, steps))
    }

    /// List workflow groups with their steps, plus a total count.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<(WorkflowGroup, Vec<WorkflowStep>)>, i64)> {
        let groups = WorkflowGroup::list(&self.pool, limit, offset).await?;
        let total = WorkflowGroup::count(&self.pool).await?;

        let mut items = Vec::with_capacity(groups.len());
        for group in groups {
            let steps = WorkflowStep::find_by_group(&self.pool, group.id).await?;
            items.push((group, steps));
        }

        Ok((items, total))
    }

    /// Update a workflow group. When the request carries steps, the existing
    /// step set is replaced wholesale.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateWorkflowGroupRequest,
    ) -> Result<(WorkflowGroup, Vec<WorkflowStep>)> {
        let existing = WorkflowGroup::find_by_id(&self.pool, id)
            .await?
            .ok_or(WorkflowError::WorkflowGroupNotFound(id))?;

        if let Some(name) = &request.name {
            if *name != existing.name
                && WorkflowGroup::find_by_name(&self.pool, name).await?.is_some()
            {
                return Err(WorkflowError::WorkflowGroupNameExists(name.clone()));
            }
        }

        let step_inputs = match &request.steps {
            Some(steps) => Some(validated_steps(steps)?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let group = WorkflowGroup::update(
            &mut *tx,
            id,
            &UpdateWorkflowGroup {
                name: request.name.clone(),
                description: request.description.clone(),
                is_active: request.is_active,
            },
        )
        .await?
        .ok_or(WorkflowError::WorkflowGroupNotFound(id))?;

        let steps = if let Some(inputs) = step_inputs {
            WorkflowStep::delete_by_group(&mut *tx, id).await?;
            WorkflowStep::create_batch(&mut *tx, id, &inputs).await?
        } else {
            WorkflowStep::find_by_group(&mut *tx, id).await?
        };

        tx.commit().await?;

        tracing::info!(workflow_group_id = %id, "Workflow group updated");

        Ok((group, steps))
    }

    /// Delete a workflow group. Refused while any service references it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let count = WorkflowGroup::count_attached_services(&self.pool, id).await?;
        if count > 0 {
            return Err(WorkflowError::WorkflowGroupInUse { id, count });
        }

        let deleted = WorkflowGroup::delete(&self.pool, id).await?;
        if !deleted {
            return Err(WorkflowError::WorkflowGroupNotFound(id));
        }

        tracing::info!(workflow_group_id = %id, "Workflow group deleted");

        Ok(())
    }
}

/// Validate a step list and convert it to persistence inputs.
fn validated_steps(steps: &[StepInput]) -> Result<Vec<CreateWorkflowStep>> {
    if steps.is_empty() {
        return Err(WorkflowError::InvalidWorkflowSteps(
            "a workflow group requires at least one step".to_string(),
        ));
    }
    if steps.len() > MAX_WORKFLOW_STEPS {
        return Err(WorkflowError::InvalidWorkflowSteps(format!(
            "at most {MAX_WORKFLOW_STEPS} steps are supported (got {})",
            steps.len()
        )));
    }

    for step in steps {
        if !validate_step(step.approver_kind, step.target_id, step.custom_query.as_deref()) {
            return Err(WorkflowError::InvalidWorkflowSteps(format!(
                "step {} has references inconsistent with its {:?} kind",
                step.step_order, step.approver_kind
            )));
        }
    }

    Ok(steps
        .iter()
        .map(|s| CreateWorkflowStep {
            step_order: s.step_order,
            approver_kind: s.approver_kind,
            target_id: s.target_id,
            custom_query: s.custom_query.clone(),
            override_user_id: s.override_user_id,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hots_db::models::ApproverKind;

    fn step(kind: ApproverKind, target: Option<Uuid>) -> StepInput {
        StepInput {
            step_order: 1,
            approver_kind: kind,
            target_id: target,
            custom_query: None,
            override_user_id: None,
        }
    }

    #[test]
    fn test_empty_step_list_rejected() {
        let err = validated_steps(&[]).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidWorkflowSteps(_)));
    }

    #[test]
    fn test_step_cap_enforced() {
        let steps: Vec<StepInput> = (0..=MAX_WORKFLOW_STEPS)
            .map(|_| step(ApproverKind::Superior, None))
            .collect();
        let err = validated_steps(&steps).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidWorkflowSteps(_)));
    }

    #[test]
    fn test_inconsistent_step_rejected() {
        let err = validated_steps(&[step(ApproverKind::Role, None)]).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidWorkflowSteps(_)));
    }

    #[test]
    fn test_valid_steps_convert() {
        let target = Uuid::new_v4();
        let inputs = validated_steps(&[
            step(ApproverKind::Team, Some(target)),
            step(ApproverKind::Superior, None),
        ])
        .unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].target_id, Some(target));
    }
}
