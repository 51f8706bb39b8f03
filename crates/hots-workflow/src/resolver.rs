//! Approver resolution.
//!
//! Expands workflow step configuration into the concrete set of user
//! identities responsible for approving at each level. Role and team steps
//! fan out to one approver per member; creator-derived steps (superior, team
//! leader, department head) consult the ticket creator's profile; custom SQL
//! steps execute a stored single-column query with the creator id bound.

use sqlx::PgPool;
use uuid::Uuid;

use hots_db::models::{ApproverKind, Division, User, WorkflowStep};

use crate::error::{Result, WorkflowError};

/// A workflow step's resolution strategy, one variant per resolver kind.
///
/// Built from the persisted step columns; each variant carries only the
/// reference it needs, so dispatch is pattern matching rather than string
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverRule {
    /// All active users holding the role.
    Role(Uuid),
    /// All active members of the team.
    Team(Uuid),
    /// The referenced user, verbatim.
    SpecificUser(Uuid),
    /// The creator's superior.
    Superior,
    /// The leader(s) of the creator's team.
    TeamLeader,
    /// The head of the creator's division.
    DepartmentHead,
    /// A stored query returning approver user ids; `$1` binds the creator.
    CustomSql(String),
}

impl ApproverRule {
    /// Build the rule from a persisted step, validating that the references
    /// the kind requires are present.
    pub fn from_step(step: &WorkflowStep) -> Result<Self> {
        let missing = |what: &str| WorkflowError::ApproverResolution {
            step_order: step.step_order,
            reason: format!("step is missing its {what}"),
        };

        match step.approver_kind {
            ApproverKind::Role => Ok(Self::Role(step.target_id.ok_or_else(|| missing("role reference"))?)),
            ApproverKind::Team => Ok(Self::Team(step.target_id.ok_or_else(|| missing("team reference"))?)),
            ApproverKind::SpecificUser => Ok(Self::SpecificUser(
                step.target_id.ok_or_else(|| missing("user reference"))?,
            )),
            ApproverKind::Superior => Ok(Self::Superior),
            ApproverKind::TeamLeader => Ok(Self::TeamLeader),
            ApproverKind::DepartmentHead => Ok(Self::DepartmentHead),
            ApproverKind::CustomSql => {
                let query = step
                    .custom_query
                    .as_deref()
                    .filter(|q| !q.trim().is_empty())
                    .ok_or_else(|| missing("query text"))?;
                Ok(Self::CustomSql(query.to_string()))
            }
        }
    }
}

/// Ticket-side context the resolver needs: the creator's profile.
#[derive(Debug, Clone)]
pub struct ResolverContext {
    pub creator: User,
}

/// A concrete (approver, level) pair ready to become an approval event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApprover {
    pub approver_id: Uuid,
    pub step_order: i32,
}

/// Resolves workflow steps to approver identities.
pub struct ApproverResolver {
    pool: PgPool,
}

impl ApproverResolver {
    /// Create a new resolver.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve every step of a workflow, catching per-step failures.
    ///
    /// A step that fails to resolve is logged and skipped; the remaining
    /// steps are still resolved, so a partially misconfigured workflow
    /// degrades instead of blocking ticket creation. Duplicate
    /// (approver, level) pairs are collapsed to one event.
    pub async fn resolve_steps(
        &self,
        steps: &[WorkflowStep],
        ctx: &ResolverContext,
    ) -> Vec<ResolvedApprover> {
        let mut outcomes = Vec::with_capacity(steps.len());
        for step in steps {
            outcomes.push((step, self.resolve_step(step, ctx).await));
        }
        fan_out(outcomes)
    }

    /// Resolve a single step to its approver identities.
    ///
    /// `specific_user` and `superior` fail loudly when the target cannot be
    /// resolved; role/team membership and custom queries may legitimately
    /// produce an empty set.
    pub async fn resolve_step(
        &self,
        step: &WorkflowStep,
        ctx: &ResolverContext,
    ) -> Result<Vec<Uuid>> {
        // An override pins the step to one user regardless of its rule.
        if let Some(override_id) = step.override_user_id {
            return Ok(vec![override_id]);
        }

        let rule = ApproverRule::from_step(step)?;
        self.resolve_rule(&rule, step.step_order, ctx).await
    }

    async fn resolve_rule(
        &self,
        rule: &ApproverRule,
        step_order: i32,
        ctx: &ResolverContext,
    ) -> Result<Vec<Uuid>> {
        let fail = |reason: String| WorkflowError::ApproverResolution { step_order, reason };

        match rule {
            ApproverRule::Role(role_id) => {
                let users = User::find_active_by_role(&self.pool, *role_id).await?;
                Ok(users.into_iter().map(|u| u.id).collect())
            }
            ApproverRule::Team(team_id) => {
                let users = User::find_active_by_team(&self.pool, *team_id).await?;
                Ok(users.into_iter().map(|u| u.id).collect())
            }
            ApproverRule::SpecificUser(user_id) => {
                let user = User::find_by_id(&self.pool, *user_id)
                    .await?
                    .filter(|u| u.is_active)
                    .ok_or_else(|| fail(format!("user {user_id} not found or inactive")))?;
                Ok(vec![user.id])
            }
            ApproverRule::Superior => {
                let superior_id = ctx
                    .creator
                    .superior_id
                    .ok_or_else(|| fail("ticket creator has no superior".to_string()))?;
                Ok(vec![superior_id])
            }
            ApproverRule::TeamLeader => {
                let team_id = ctx
                    .creator
                    .team_id
                    .ok_or_else(|| fail("ticket creator has no team".to_string()))?;
                let leaders = User::find_team_leaders(&self.pool, team_id).await?;
                Ok(leaders.into_iter().map(|u| u.id).collect())
            }
            ApproverRule::DepartmentHead => {
                let division_id = ctx
                    .creator
                    .division_id
                    .ok_or_else(|| fail("ticket creator has no division".to_string()))?;
                let division = Division::find_by_id(&self.pool, division_id)
                    .await?
                    .ok_or_else(|| fail(format!("division {division_id} not found")))?;
                Ok(division.head_user_id.into_iter().collect())
            }
            ApproverRule::CustomSql(query) => self.run_custom_query(query, step_order, ctx).await,
        }
    }

    /// Execute a stored single-column query with the creator id bound as
    /// `$1`. Malformed queries and empty results resolve to no approvers
    /// rather than aborting ticket creation, but are logged for operators.
    async fn run_custom_query(
        &self,
        query: &str,
        step_order: i32,
        ctx: &ResolverContext,
    ) -> Result<Vec<Uuid>> {
        match sqlx::query_scalar::<_, Uuid>(query)
            .bind(ctx.creator.id)
            .fetch_all(&self.pool)
            .await
        {
            Ok(ids) => Ok(ids),
            Err(err) => {
                tracing::warn!(
                    step_order,
                    creator_id = %ctx.creator.id,
                    error = %err,
                    "Custom approver query failed; treating step as unresolved"
                );
                Ok(Vec::new())
            }
        }
    }
}

/// Turn per-step resolution outcomes into the final (approver, level) set.
///
/// A failed or empty step is logged and skipped without affecting the
/// remaining steps; duplicate (approver, level) pairs collapse to one event.
fn fan_out(outcomes: Vec<(&WorkflowStep, Result<Vec<Uuid>>)>) -> Vec<ResolvedApprover> {
    let mut resolved: Vec<ResolvedApprover> = Vec::new();

    for (step, outcome) in outcomes {
        let approvers = match outcome {
            Ok(approvers) => approvers,
            Err(err) => {
                tracing::warn!(
                    step_id = %step.id,
                    step_order = step.step_order,
                    kind = ?step.approver_kind,
                    error = %err,
                    "Skipping workflow step: approver resolution failed"
                );
                continue;
            }
        };

        if approvers.is_empty() {
            tracing::warn!(
                step_id = %step.id,
                step_order = step.step_order,
                kind = ?step.approver_kind,
                "Workflow step resolved to no approvers; skipping"
            );
            continue;
        }

        for approver_id in approvers {
            let pair = ResolvedApprover {
                approver_id,
                step_order: step.step_order,
            };
            if !resolved.contains(&pair) {
                resolved.push(pair);
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hots_db::models::ApproverKind;

    fn step(kind: ApproverKind, target: Option<Uuid>, query: Option<&str>) -> WorkflowStep {
        WorkflowStep {
            id: Uuid::new_v4(),
            workflow_group_id: Uuid::new_v4(),
            step_order: 1,
            approver_kind: kind,
            target_id: target,
            custom_query: query.map(str::to_string),
            override_user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rule_from_targeted_step() {
        let role_id = Uuid::new_v4();
        let rule = ApproverRule::from_step(&step(ApproverKind::Role, Some(role_id), None)).unwrap();
        assert_eq!(rule, ApproverRule::Role(role_id));

        let user_id = Uuid::new_v4();
        let rule =
            ApproverRule::from_step(&step(ApproverKind::SpecificUser, Some(user_id), None)).unwrap();
        assert_eq!(rule, ApproverRule::SpecificUser(user_id));
    }

    #[test]
    fn test_rule_from_step_missing_target_fails() {
        let err = ApproverRule::from_step(&step(ApproverKind::Team, None, None)).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::ApproverResolution { step_order: 1, .. }
        ));
    }

    #[test]
    fn test_rule_from_creator_derived_step() {
        let rule = ApproverRule::from_step(&step(ApproverKind::Superior, None, None)).unwrap();
        assert_eq!(rule, ApproverRule::Superior);

        let rule = ApproverRule::from_step(&step(ApproverKind::DepartmentHead, None, None)).unwrap();
        assert_eq!(rule, ApproverRule::DepartmentHead);
    }

    #[test]
    fn test_rule_from_custom_sql_step() {
        let q = "SELECT approver_id FROM delegations WHERE user_id = $1";
        let rule = ApproverRule::from_step(&step(ApproverKind::CustomSql, None, Some(q))).unwrap();
        assert_eq!(rule, ApproverRule::CustomSql(q.to_string()));

        let err =
            ApproverRule::from_step(&step(ApproverKind::CustomSql, None, Some("  "))).unwrap_err();
        assert!(matches!(err, WorkflowError::ApproverResolution { .. }));
    }

    fn step_at(order: i32, kind: ApproverKind) -> WorkflowStep {
        let mut s = step(kind, None, None);
        s.step_order = order;
        s
    }

    #[test]
    fn test_fan_out_one_event_per_member() {
        let members = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let team_step = step_at(1, ApproverKind::Team);

        let resolved = fan_out(vec![(&team_step, Ok(members.clone()))]);

        assert_eq!(resolved.len(), 3);
        for member in members {
            assert!(resolved.contains(&ResolvedApprover {
                approver_id: member,
                step_order: 1,
            }));
        }
    }

    #[test]
    fn test_fan_out_collapses_duplicate_pairs() {
        let shared = Uuid::new_v4();
        let role_step = step_at(1, ApproverKind::Role);
        let team_step = step_at(1, ApproverKind::Team);

        // The same user matched by two steps at the same level.
        let resolved = fan_out(vec![
            (&role_step, Ok(vec![shared])),
            (&team_step, Ok(vec![shared, Uuid::new_v4()])),
        ]);

        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved
                .iter()
                .filter(|r| r.approver_id == shared)
                .count(),
            1
        );
    }

    #[test]
    fn test_fan_out_duplicate_approver_kept_across_levels() {
        let shared = Uuid::new_v4();
        let first = step_at(1, ApproverKind::Superior);
        let second = step_at(2, ApproverKind::Role);

        let resolved = fan_out(vec![
            (&first, Ok(vec![shared])),
            (&second, Ok(vec![shared])),
        ]);

        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_fan_out_failed_step_does_not_abort_remaining() {
        let survivor = Uuid::new_v4();
        let failing = step_at(1, ApproverKind::Superior);
        let empty = step_at(2, ApproverKind::Role);
        let ok = step_at(3, ApproverKind::SpecificUser);

        let resolved = fan_out(vec![
            (
                &failing,
                Err(WorkflowError::ApproverResolution {
                    step_order: 1,
                    reason: "ticket creator has no superior".to_string(),
                }),
            ),
            (&empty, Ok(Vec::new())),
            (&ok, Ok(vec![survivor])),
        ]);

        assert_eq!(
            resolved,
            vec![ResolvedApprover {
                approver_id: survivor,
                step_order: 3,
            }]
        );
    }
}
