//! Business logic services for the ticket API.

pub mod approval_service;
pub mod ticket_service;
pub mod workflow_group_service;

pub use approval_service::{ApprovalService, DecisionOutcome, PendingApproval};
pub use ticket_service::{CreatedTicket, TicketAggregate, TicketService};
pub use workflow_group_service::WorkflowGroupService;
