//! Approval workflow engine for the HOTS ticketing service.
//!
//! Core domain logic for multi-step ticket approval:
//!
//! - [`resolver`] — expands workflow steps into concrete approver identities
//!   (by role, team, specific user, superior, team leader, department head,
//!   or a stored custom query).
//! - [`advancement`] — pure functions deriving the active approval level and
//!   the workflow outcome from a ticket's event list.
//! - [`trigger`] — fire-and-forget lifecycle event publishing over a
//!   broadcast channel.
//! - [`functions`] — the worker that consumes lifecycle events and runs
//!   configured custom functions as best-effort side effects.
//!
//! The engine treats a single PostgreSQL database as the sole source of
//! truth. The only concurrency safeguards are the ticket row lock taken by
//! the decision flow and the single-waiting-row update guard in the event
//! store.

pub mod advancement;
pub mod error;
pub mod functions;
pub mod resolver;
pub mod trigger;

pub use advancement::{active_level, authorize_decision, outcome, WorkflowOutcome};
pub use error::{Result, WorkflowError};
pub use functions::{CustomFunctionWorker, FunctionHandler};
pub use resolver::{ApproverResolver, ApproverRule, ResolvedApprover, ResolverContext};
pub use trigger::{TicketEvent, TicketEventPublisher};
