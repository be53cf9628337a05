use serde::{Deserialize, Serialize};

use crate::models::session::ResourceRef;

/// A user directory entry, as `/get_usuarios` reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: i64,
    pub full_name: String,
    pub rut: Option<String>,
    pub email: Option<String>,
    pub management_unit: Option<String>,
    pub area: Option<String>,
    pub position: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    /// Tanks assigned to this user, in backend order.
    pub assigned_resources: Vec<ResourceRef>,
}

/// One entry of the role catalog, as `/get_roles` reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub id: i64,
    pub name: String,
}
