//! Ticket and approval API endpoints for HOTS.
//!
//! # Endpoints
//!
//! ## Tickets
//! - `GET/POST /tickets` - Submit and list service requests
//! - `GET /tickets/:id` - Ticket detail with nested approval events
//! - `POST /tickets/:id/status` - Fulfillment transitions
//!
//! ## Approvals
//! - `GET /my-approvals` - Pending approval queue for the acting user
//! - `POST /tickets/:id/approve` - Record an approval decision
//! - `POST /tickets/:id/reject` - Record a rejection decision
//!
//! ## Workflow administration
//! - `GET/POST /workflow-groups` - Workflow group management
//! - `GET/PUT/DELETE /workflow-groups/:id` - Individual group operations

pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod router;
pub mod services;

pub use error::{ApiResult, ApiTicketsError, ErrorResponse};
pub use identity::{identity_middleware, IdentityConfig, RequestIdentity};
pub use router::{tickets_router, TicketsState};
