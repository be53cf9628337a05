use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known role names, as the backend's role catalog spells them.
pub const ROLE_ADMIN_TI: &str = "ADMIN_TI";
pub const ROLE_COMPRAS: &str = "COMPRAS";
pub const ROLE_BODEGA: &str = "BODEGA";
pub const ROLE_SOLICITANTE: &str = "SOLICITANTE";

/// A physical resource (storage tank) assigned to the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// The location code of the resource.
    pub codigo: String,
    /// The display name of the resource.
    pub nombre: String,
}

/// Represents an authenticated session.
///
/// Created by `SessionContext::authenticate` and held in the process-wide
/// session slot until `terminate`. A session whose `roles` set is empty is
/// treated as unauthenticated for authorization purposes even though a
/// token is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Client-side correlation id for this session (appears in logs).
    pub id: Uuid,
    /// The user's display name.
    pub user_name: String,
    /// The user's email address.
    pub email: String,
    /// The roles assigned to the user, upper-cased at creation.
    pub roles: Vec<String>,
    /// The user's area, when the backend reports one.
    pub area: Option<String>,
    /// The user's management unit (gerencia), when the backend reports one.
    pub management_unit: Option<String>,
    /// Resources (tanks) assigned to the user, in backend order.
    pub assigned_resources: Vec<ResourceRef>,
    /// The bearer token attached to every backend call.
    pub token: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether this session counts as authenticated: a token alone is not
    /// enough, the role set must be non-empty.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty() && !self.roles.is_empty()
    }

    /// Whether the session holds the given role (exact match; roles were
    /// upper-cased at creation).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// A navigation target chosen from the session's roles after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingRoute {
    /// ADMIN_TI: the administration dashboard.
    AdminDashboard,
    /// COMPRAS: the buyers dashboard.
    BuyersDashboard,
    /// BODEGA: the fuel request screen.
    FuelRequest,
    /// SOLICITANTE: the request submission screen.
    RequestMain,
    /// No recognized role: the safe default route.
    Home,
}

/// Picks the post-login landing route from the session's roles.
///
/// Role precedence mirrors the login redirect table: ADMIN_TI wins over
/// COMPRAS, which wins over BODEGA, which wins over SOLICITANTE.
pub fn landing_route(session: &Session) -> LandingRoute {
    if session.has_role(ROLE_ADMIN_TI) {
        LandingRoute::AdminDashboard
    } else if session.has_role(ROLE_COMPRAS) {
        LandingRoute::BuyersDashboard
    } else if session.has_role(ROLE_BODEGA) {
        LandingRoute::FuelRequest
    } else if session.has_role(ROLE_SOLICITANTE) {
        LandingRoute::RequestMain
    } else {
        LandingRoute::Home
    }
}
