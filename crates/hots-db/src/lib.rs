//! Database layer for the HOTS ticketing service.
//!
//! Provides `sqlx`/PostgreSQL persistence models for tickets, approval
//! events, workflow configuration, and custom function configuration, plus
//! embedded migrations.
//!
//! Models follow a struct-with-query-functions pattern: each model file
//! defines the row struct and its parameterized queries. Query functions
//! accept `impl PgExecutor` so callers can pass either a pool or an open
//! transaction.

pub mod error;
pub mod migrations;
pub mod models;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{
    ApprovalEvent, ApproverKind, CreateApprovalEvent, CreateCustomFunction, CreateTicket,
    CreateTicketDetail, CreateWorkflowGroup, CreateWorkflowStep, CustomFunction, Division,
    EventStatus, FunctionKind, ServiceItem, Ticket, TicketDetail, TicketFilter, TicketStatus,
    TriggerEvent, UpdateWorkflowGroup, User, WorkflowGroup, WorkflowStep,
};
