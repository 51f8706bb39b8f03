//! Custom function configuration model.
//!
//! A custom function is a configured side-effect handler (document
//! generation, spreadsheet processing, email, API call) invoked on ticket
//! lifecycle events. Handlers are best-effort: failures never affect ticket
//! state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle events a custom function can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trigger_event", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// Ticket created and approval events materialized.
    OnCreated,
    /// An approval level fully resolved, more levels remain.
    OnStepApproved,
    /// Ticket reached `approved`.
    OnApproved,
    /// Ticket reached `approved` via the last pending level.
    OnFinalApproved,
    /// Ticket reached `rejected`.
    OnRejected,
}

/// Kind of side-effect handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "function_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Generate a document from a template.
    Document,
    /// Produce or update a spreadsheet.
    Spreadsheet,
    /// Send a notification email.
    Email,
    /// Call an external HTTP API.
    ApiCall,
}

/// A configured custom function row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomFunction {
    /// Unique identifier.
    pub id: Uuid,

    /// The catalog service this function is configured for.
    pub service_id: Uuid,

    /// Display name, for operator logs.
    pub name: String,

    /// Lifecycle event that fires this function.
    pub trigger_event: TriggerEvent,

    /// Handler kind.
    pub kind: FunctionKind,

    /// Execution order within the same event, ascending.
    pub execution_order: i32,

    /// Handler-specific configuration.
    pub config: serde_json::Value,

    /// Whether the function is enabled.
    pub is_active: bool,

    /// When the function was configured.
    pub created_at: DateTime<Utc>,
}

/// Input for configuring a custom function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomFunction {
    pub service_id: Uuid,
    pub name: String,
    pub trigger_event: TriggerEvent,
    pub kind: FunctionKind,
    pub execution_order: i32,
    pub config: serde_json::Value,
}

impl CustomFunction {
    /// Find active functions for a service and event, in execution order.
    pub async fn find_for_event(
        executor: impl sqlx::PgExecutor<'_>,
        service_id: Uuid,
        trigger_event: TriggerEvent,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM custom_functions
            WHERE service_id = $1 AND trigger_event = $2 AND is_active
            ORDER BY execution_order ASC, created_at ASC
            ",
        )
        .bind(service_id)
        .bind(trigger_event)
        .fetch_all(executor)
        .await
    }

    /// List all functions configured for a service.
    pub async fn list_by_service(
        pool: &sqlx::PgPool,
        service_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM custom_functions
            WHERE service_id = $1
            ORDER BY trigger_event, execution_order ASC
            ",
        )
        .bind(service_id)
        .fetch_all(pool)
        .await
    }

    /// Configure a new custom function.
    pub async fn create(
        executor: impl sqlx::PgExecutor<'_>,
        input: &CreateCustomFunction,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO custom_functions
                (service_id, name, trigger_event, kind, execution_order, config)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(input.service_id)
        .bind(&input.name)
        .bind(input.trigger_event)
        .bind(input.kind)
        .bind(input.execution_order)
        .bind(&input.config)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_event_serialization() {
        let json = serde_json::to_string(&TriggerEvent::OnFinalApproved).unwrap();
        assert_eq!(json, "\"on_final_approved\"");

        let restored: TriggerEvent = serde_json::from_str("\"on_rejected\"").unwrap();
        assert_eq!(restored, TriggerEvent::OnRejected);
    }

    #[test]
    fn test_function_kind_serialization() {
        let kinds = [
            (FunctionKind::Document, "\"document\""),
            (FunctionKind::Spreadsheet, "\"spreadsheet\""),
            (FunctionKind::Email, "\"email\""),
            (FunctionKind::ApiCall, "\"api_call\""),
        ];
        for (kind, expected) in kinds {
            assert_eq!(serde_json::to_string(&kind).unwrap(), expected);
        }
    }
}
