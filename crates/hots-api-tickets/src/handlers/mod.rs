//! HTTP handlers for ticket API endpoints.

pub mod approvals;
pub mod tickets;
pub mod workflow_groups;
