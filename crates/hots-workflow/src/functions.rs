//! Custom function execution.
//!
//! Consumes ticket lifecycle events and runs the custom functions configured
//! for the ticket's service and event type, in execution order. Handlers are
//! outside the engine's consistency boundary: a handler failure is logged
//! with the ticket and function identifiers and never rolls back or blocks a
//! ticket transition.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::broadcast;

use hots_db::models::{CustomFunction, FunctionKind};

use crate::trigger::TicketEvent;

/// A side-effect handler for one function kind.
///
/// Implementations live outside the engine (document rendering, mailers,
/// HTTP clients); the worker only dispatches to them.
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    /// Execute the configured function for the given event.
    async fn execute(
        &self,
        function: &CustomFunction,
        event: &TicketEvent,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Background worker that drains the lifecycle event channel and invokes
/// configured custom functions.
pub struct CustomFunctionWorker {
    pool: PgPool,
    receiver: broadcast::Receiver<TicketEvent>,
    handlers: HashMap<FunctionKind, Arc<dyn FunctionHandler>>,
}

impl CustomFunctionWorker {
    /// Create a worker with no handlers registered.
    #[must_use]
    pub fn new(pool: PgPool, receiver: broadcast::Receiver<TicketEvent>) -> Self {
        Self {
            pool,
            receiver,
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for a function kind, replacing any previous one.
    #[must_use]
    pub fn with_handler(mut self, kind: FunctionKind, handler: Arc<dyn FunctionHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Run until the event channel closes.
    pub async fn run(mut self) {
        tracing::info!(
            target: "custom_functions",
            handlers = self.handlers.len(),
            "Custom function worker started"
        );

        loop {
            match self.receiver.recv().await {
                Ok(event) => self.process_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(
                        target: "custom_functions",
                        missed,
                        "Event channel lagged; skipped events are lost"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(target: "custom_functions", "Event channel closed; worker stopping");
                    break;
                }
            }
        }
    }

    async fn process_event(&self, event: &TicketEvent) {
        let functions =
            match CustomFunction::find_for_event(&self.pool, event.service_id, event.event_type)
                .await
            {
                Ok(functions) => functions,
                Err(err) => {
                    tracing::error!(
                        target: "custom_functions",
                        ticket_id = %event.ticket_id,
                        event_type = ?event.event_type,
                        error = %err,
                        "Failed to load custom functions for event"
                    );
                    return;
                }
            };

        for function in functions {
            self.invoke(&function, event).await;
        }
    }

    async fn invoke(&self, function: &CustomFunction, event: &TicketEvent) {
        let Some(handler) = self.handlers.get(&function.kind) else {
            tracing::warn!(
                target: "custom_functions",
                function_id = %function.id,
                function = %function.name,
                kind = ?function.kind,
                "No handler registered for function kind; skipping"
            );
            return;
        };

        match handler.execute(function, event).await {
            Ok(()) => {
                tracing::info!(
                    target: "custom_functions",
                    ticket_id = %event.ticket_id,
                    function_id = %function.id,
                    function = %function.name,
                    event_type = ?event.event_type,
                    "Custom function executed"
                );
            }
            Err(err) => {
                // Best-effort: log and move on to the next function.
                tracing::error!(
                    target: "custom_functions",
                    ticket_id = %event.ticket_id,
                    function_id = %function.id,
                    function = %function.name,
                    event_type = ?event.event_type,
                    error = %err,
                    "Custom function failed"
                );
            }
        }
    }
}
