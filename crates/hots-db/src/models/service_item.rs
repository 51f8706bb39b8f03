//! Service catalog item model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog entry users can request, carrying the workflow and fulfillment
/// routing configuration.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Unique identifier.
    pub id: Uuid,

    /// Display name, unique.
    pub name: String,

    /// Approval workflow applied to tickets for this service. `None` means
    /// no approvals are required.
    pub workflow_group_id: Option<Uuid>,

    /// Team that fulfills approved tickets.
    pub fulfillment_team_id: Option<Uuid>,

    /// Whether the service can be requested.
    pub is_active: bool,

    /// When the service was created.
    pub created_at: DateTime<Utc>,
}

impl ServiceItem {
    /// Find a service by ID.
    pub async fn find_by_id(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM service_items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// List active services.
    pub async fn list_active(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM service_items
            WHERE is_active
            ORDER BY name ASC
            ",
        )
        .fetch_all(pool)
        .await
    }
}
