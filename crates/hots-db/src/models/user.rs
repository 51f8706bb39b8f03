//! User and division models.
//!
//! Read-only to the workflow engine: identity and org structure are managed
//! elsewhere, the engine only consults them to resolve approvers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user account with the org references the resolver needs.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,

    /// Login name, unique.
    pub username: String,

    /// Display name.
    pub display_name: String,

    /// Email address, unique.
    pub email: String,

    /// Role reference.
    pub role_id: Option<Uuid>,

    /// Team reference.
    pub team_id: Option<Uuid>,

    /// Division reference.
    pub division_id: Option<Uuid>,

    /// Direct superior.
    pub superior_id: Option<Uuid>,

    /// Whether this user leads their team.
    pub is_team_leader: bool,

    /// Whether the account is active.
    pub is_active: bool,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// An organizational division with an optional head record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Division {
    /// Unique identifier.
    pub id: Uuid,

    /// Display name, unique.
    pub name: String,

    /// The division head.
    pub head_user_id: Option<Uuid>,

    /// When the division was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Find a user by ID.
    pub async fn find_by_id(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Find all active users holding a role.
    pub async fn find_active_by_role(
        executor: impl sqlx::PgExecutor<'_>,
        role_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE role_id = $1 AND is_active
            ORDER BY username ASC
            ",
        )
        .bind(role_id)
        .fetch_all(executor)
        .await
    }

    /// Find all active members of a team.
    pub async fn find_active_by_team(
        executor: impl sqlx::PgExecutor<'_>,
        team_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE team_id = $1 AND is_active
            ORDER BY username ASC
            ",
        )
        .bind(team_id)
        .fetch_all(executor)
        .await
    }

    /// Find the active leader(s) of a team.
    pub async fn find_team_leaders(
        executor: impl sqlx::PgExecutor<'_>,
        team_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE team_id = $1 AND is_team_leader AND is_active
            ORDER BY username ASC
            ",
        )
        .bind(team_id)
        .fetch_all(executor)
        .await
    }
}

impl Division {
    /// Find a division by ID.
    pub async fn find_by_id(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM divisions
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
