//! Request and response models for ticket API endpoints.

pub mod approval;
pub mod ticket;
pub mod workflow_group;

pub use approval::{
    ApprovalEventView, ApproveTicketRequest, DecisionResponse, ListPendingApprovalsQuery,
    PendingApprovalItem, PendingApprovalListResponse, RejectTicketRequest,
};
pub use ticket::{
    CreateTicketRequest, ListTicketsQuery, TicketDetailInput, TicketDetailSlot, TicketListResponse,
    TicketResponse, UpdateTicketStatusRequest,
};
pub use workflow_group::{
    CreateWorkflowGroupRequest, StepInput, UpdateWorkflowGroupRequest, WorkflowGroupListResponse,
    WorkflowGroupResponse,
};
