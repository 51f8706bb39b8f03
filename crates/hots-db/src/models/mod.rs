//! Persistence models for the HOTS ticketing service.

pub mod approval_event;
pub mod custom_function;
pub mod service_item;
pub mod ticket;
pub mod ticket_detail;
pub mod user;
pub mod workflow_group;
pub mod workflow_step;

pub use approval_event::{ApprovalEvent, CreateApprovalEvent, EventStatus};
pub use custom_function::{CreateCustomFunction, CustomFunction, FunctionKind, TriggerEvent};
pub use service_item::ServiceItem;
pub use ticket::{CreateTicket, Ticket, TicketFilter, TicketStatus};
pub use ticket_detail::{CreateTicketDetail, TicketDetail, MAX_DETAIL_SLOTS};
pub use user::{Division, User};
pub use workflow_group::{CreateWorkflowGroup, UpdateWorkflowGroup, WorkflowGroup};
pub use workflow_step::{validate_step, ApproverKind, CreateWorkflowStep, WorkflowStep};
