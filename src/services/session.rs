use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::{AppError, Result};
use crate::models::session::Session;
use crate::validation::{self, Credentials};

/// Single source of truth for "who is acting".
///
/// Holds the one active session per process in an explicit slot with an
/// init (`authenticate`) and teardown (`terminate`) contract. No other
/// component writes the slot; everything else only reads it.
#[derive(Clone, Default)]
pub struct SessionContext {
    slot: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    /// Creates a new, unauthenticated `SessionContext`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchanges credentials for a session via the backend and stores it
    /// in the process-wide slot.
    ///
    /// # Arguments
    ///
    /// * `backend` - The backend that checks the credentials.
    /// * `credentials` - The user's RUT and password.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Session`.
    pub async fn authenticate<B: Backend>(
        &self,
        backend: &B,
        credentials: &Credentials,
    ) -> Result<Session> {
        validation::validate_credentials(credentials)?;

        let profile = backend.login(credentials).await?;

        // Roles are normalized to upper case once, here; the gate compares
        // exact strings afterwards.
        let roles: Vec<String> = profile.roles.iter().map(|r| r.to_uppercase()).collect();

        let session = Session {
            id: Uuid::new_v4(),
            user_name: profile.user_name,
            email: profile.email,
            roles,
            area: profile.area,
            management_unit: profile.management_unit,
            assigned_resources: profile.assigned_resources,
            token: profile.token,
            created_at: Utc::now(),
        };

        if session.roles.is_empty() {
            tracing::warn!("⚠️ User {} logged in without roles", session.user_name);
        }

        let mut slot = self
            .slot
            .write()
            .map_err(|_| AppError::Internal("session slot poisoned".to_string()))?;
        *slot = Some(session.clone());

        tracing::info!("✅ Session {} opened for {}", session.id, session.user_name);
        Ok(session)
    }

    /// Returns a snapshot of the current session, if any. Pure read.
    pub fn current(&self) -> Option<Session> {
        self.slot.read().ok().and_then(|guard| guard.clone())
    }

    /// Whether an authenticated session (non-empty role set) is active.
    pub fn is_authenticated(&self) -> bool {
        self.current().map(|s| s.is_authenticated()).unwrap_or(false)
    }

    /// Clears the session slot. Idempotent: terminating twice is not an
    /// error.
    pub fn terminate(&self) {
        if let Ok(mut slot) = self.slot.write() {
            if let Some(session) = slot.take() {
                tracing::info!("👋 Session {} closed for {}", session.id, session.user_name);
            }
        }
    }
}
