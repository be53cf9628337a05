//! Central yes/no decision for "may this session perform this operation".
//!
//! Pure functions of their inputs; used identically to gate navigation and
//! the approve/reject actions.

use crate::error::{AppError, Result};
use crate::models::session::Session;

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No session, or a session with an empty role set.
    Unauthenticated,
    /// Authenticated, but none of the required roles is held.
    InsufficientRole,
}

/// The outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(DenyReason),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }

    /// Converts a denial into the matching error, for callers that gate
    /// with `?`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Access::Allowed => Ok(()),
            Access::Denied(DenyReason::Unauthenticated) => Err(AppError::Unauthenticated),
            Access::Denied(DenyReason::InsufficientRole) => Err(AppError::Forbidden),
        }
    }
}

/// Returns true iff the session is authenticated and shares at least one
/// role with `required_roles`. An empty `required_roles` means "any
/// authenticated session". It must still be authenticated.
///
/// A session with an empty role set is unauthenticated here even if it
/// carries a token.
pub fn can_perform(session: Option<&Session>, required_roles: &[&str]) -> bool {
    authorize_or_deny(session, required_roles).is_allowed()
}

/// Like [`can_perform`], but carries the reason for a denial.
pub fn authorize_or_deny(session: Option<&Session>, required_roles: &[&str]) -> Access {
    let Some(session) = session else {
        return Access::Denied(DenyReason::Unauthenticated);
    };
    if !session.is_authenticated() {
        return Access::Denied(DenyReason::Unauthenticated);
    }
    if required_roles.is_empty() {
        return Access::Allowed;
    }
    if required_roles.iter().any(|r| session.has_role(r)) {
        Access::Allowed
    } else {
        Access::Denied(DenyReason::InsufficientRole)
    }
}
