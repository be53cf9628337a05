//! The ERP backend collaborator.
//!
//! The core never assumes success from HTTP 200 alone: several endpoints
//! answer 200 with an embedded `status == "error"`, which must surface as
//! `AppError::ApplicationRejected` carrying the backend's message verbatim.

pub mod http;

use std::future::Future;

use crate::error::Result;
use crate::models::request::ApprovableRequest;
use crate::models::session::ResourceRef;
use crate::models::user::{DirectoryUser, RoleEntry};
use crate::validation::Credentials;

/// Which approval collection a dashboard is backed by. Each domain maps to
/// its own pair of fetch/update endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDomain {
    /// User administration requests (`/get_solicitudes_usuario`).
    UserAdmin,
    /// Product master-data requests (`/get_solicitudes_maestro`).
    MasterData,
}

impl RequestDomain {
    /// The `accion` spelling each domain's update endpoint expects. The
    /// user-admin endpoint takes the target status, the maestro endpoint
    /// takes the imperative form.
    pub fn wire_action(&self, action: crate::models::request::ReviewAction) -> &'static str {
        use crate::models::request::ReviewAction;
        match (self, action) {
            (RequestDomain::UserAdmin, ReviewAction::Approve) => "APROBADO",
            (RequestDomain::UserAdmin, ReviewAction::Reject) => "RECHAZADO",
            (RequestDomain::MasterData, ReviewAction::Approve) => "APROBAR",
            (RequestDomain::MasterData, ReviewAction::Reject) => "RECHAZAR",
        }
    }
}

/// The profile the backend returns on a successful login.
#[derive(Debug, Clone)]
pub struct LoginProfile {
    pub token: String,
    pub user_name: String,
    pub roles: Vec<String>,
    pub email: String,
    pub area: Option<String>,
    pub management_unit: Option<String>,
    pub assigned_resources: Vec<ResourceRef>,
}

/// An approve/reject decision ready to be persisted.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub domain: RequestDomain,
    pub request_id: i64,
    /// The target status in the backend's spelling (APROBADO/RECHAZADO).
    pub action: String,
    pub comment: String,
    /// User name of the reviewer, recorded by the backend as approver.
    pub reviewer: String,
    /// Email of the original requester, used by the backend to notify them.
    pub requester_email: Option<String>,
}

/// Backend operations the core depends on.
///
/// Generic seam so that services stay independent of the HTTP layer; tests
/// substitute an in-memory implementation.
pub trait Backend: Send + Sync {
    /// Exchanges credentials for a token + roles + profile.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginProfile>> + Send;

    /// Fetches the raw approval collection for a domain.
    fn list_requests(
        &self,
        domain: RequestDomain,
    ) -> impl Future<Output = Result<Vec<ApprovableRequest>>> + Send;

    /// Persists an approve/reject decision. Returns the backend's
    /// user-facing confirmation message.
    fn persist_transition(
        &self,
        record: &TransitionRecord,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Fetches the user directory.
    fn list_users(&self) -> impl Future<Output = Result<Vec<DirectoryUser>>> + Send;

    /// Fetches the role catalog.
    fn list_roles(&self) -> impl Future<Output = Result<Vec<RoleEntry>>> + Send;
}
