//! Approval-workflow and list-query core for the SAP process optimizer
//! frontend.
//!
//! Four cooperating components:
//! - [`services::session::SessionContext`] tracks who is acting;
//! - [`services::authz`] decides whether a session may perform an
//!   operation;
//! - [`services::lifecycle`] enforces the PENDING to APPROVED/REJECTED
//!   state machine;
//! - [`services::query`] performs deterministic filtering, sorting, and
//!   pagination of record collections.
//!
//! The ERP backend is an external collaborator behind the
//! [`backend::Backend`] trait; [`backend::http::HttpBackend`] is the REST
//! implementation. The hosting UI fetches collections, renders pages from
//! the query engine, and invokes gated transitions which are persisted
//! before the local collection is patched optimistically.

pub mod config;
pub mod error;
pub mod validation;

pub mod models {
    pub mod query;
    pub mod request;
    pub mod session;
    pub mod user;
}

pub mod backend;

pub mod services {
    pub mod approvals;
    pub mod authz;
    pub mod lifecycle;
    pub mod query;
    pub mod session;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use models::query::{ListPage, QuerySpec, Searchable, SortOrder};
pub use models::request::{ApprovableRequest, RequestPayload, RequestStatus, ReviewAction};
pub use models::session::{LandingRoute, ResourceRef, Session, landing_route};
pub use services::approvals::{ApprovalService, RequestBoard, RequestStats};
pub use services::authz::{Access, DenyReason, authorize_or_deny, can_perform};
pub use services::session::SessionContext;
pub use validation::Credentials;
