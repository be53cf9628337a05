//! Orchestration of the approval dashboards: fetch, optimistic patch,
//! poll reconciliation, and gated approve/reject decisions.
//!
//! The persistence call must succeed before the local patch is applied;
//! on any failure the board is left untouched and the error is surfaced
//! at the failing action.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::backend::{Backend, RequestDomain, TransitionRecord};
use crate::error::{AppError, Result};
use crate::models::query::{ListPage, QuerySpec};
use crate::models::request::{ApprovableRequest, RequestStatus, ReviewAction};
use crate::models::session::ROLE_ADMIN_TI;
use crate::services::authz::{self, Access};
use crate::services::lifecycle;
use crate::services::query;
use crate::services::session::SessionContext;

/// Roles allowed to finalize requests in a domain. Both approval
/// dashboards are admin-scoped.
pub fn required_reviewer_roles(domain: RequestDomain) -> &'static [&'static str] {
    match domain {
        RequestDomain::UserAdmin => &[ROLE_ADMIN_TI],
        RequestDomain::MasterData => &[ROLE_ADMIN_TI],
    }
}

/// Counters every dashboard header renders, computed over the unfiltered
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// An optimistic local patch awaiting confirmation by a poll snapshot.
#[derive(Debug, Clone)]
struct PatchRecord {
    request: ApprovableRequest,
    applied_at: DateTime<Utc>,
    /// How many poll snapshots have contradicted this patch so far.
    contradicted: u8,
}

/// The in-memory collection behind one dashboard, with optimistic patches
/// tracked by request id.
///
/// Poll precedence policy: a local patch wins over the first poll snapshot
/// that contradicts it; a second contradicting snapshot wins over the
/// patch. A snapshot that agrees with the patch confirms it and clears
/// the record.
#[derive(Debug, Clone)]
pub struct RequestBoard {
    domain: RequestDomain,
    items: Vec<ApprovableRequest>,
    patches: HashMap<i64, PatchRecord>,
}

impl RequestBoard {
    pub fn new(domain: RequestDomain) -> Self {
        Self {
            domain,
            items: Vec::new(),
            patches: HashMap::new(),
        }
    }

    pub fn domain(&self) -> RequestDomain {
        self.domain
    }

    /// The current collection, optimistic patches included.
    pub fn items(&self) -> &[ApprovableRequest] {
        &self.items
    }

    pub fn find(&self, request_id: i64) -> Option<&ApprovableRequest> {
        self.items.iter().find(|r| r.id == request_id)
    }

    /// A filtered, sorted, paginated view of the board.
    pub fn query(&self, spec: &QuerySpec) -> Result<ListPage<ApprovableRequest>> {
        query::query_requests(&self.items, spec)
    }

    /// Status counters over the unfiltered collection.
    pub fn stats(&self) -> RequestStats {
        let mut stats = RequestStats {
            total: self.items.len(),
            ..RequestStats::default()
        };
        for item in &self.items {
            match item.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
        }
        stats
    }

    /// Replaces the record with the given id after a successful
    /// persistence call, and tracks it as an optimistic patch.
    fn apply_patch(&mut self, updated: ApprovableRequest) {
        if let Some(slot) = self.items.iter_mut().find(|r| r.id == updated.id) {
            *slot = updated.clone();
            self.patches.insert(
                updated.id,
                PatchRecord {
                    request: updated,
                    applied_at: Utc::now(),
                    contradicted: 0,
                },
            );
        }
    }

    /// Replaces the collection with a poll snapshot, reapplying optimistic
    /// patches the snapshot has not yet confirmed.
    pub fn reconcile(&mut self, mut snapshot: Vec<ApprovableRequest>) {
        let mut confirmed: Vec<i64> = Vec::new();

        for (id, patch) in self.patches.iter_mut() {
            match snapshot.iter_mut().find(|r| r.id == *id) {
                Some(row) if row.status == patch.request.status => {
                    confirmed.push(*id);
                }
                Some(row) => {
                    patch.contradicted += 1;
                    if patch.contradicted >= 2 {
                        // Two polls in a row disagree: the backend wins.
                        tracing::warn!(
                            "↩️ Dropping optimistic patch for solicitud {} (applied {}): poll disagrees",
                            id,
                            patch.applied_at
                        );
                        confirmed.push(*id);
                    } else {
                        *row = patch.request.clone();
                    }
                }
                None => {
                    confirmed.push(*id);
                }
            }
        }

        for id in confirmed {
            self.patches.remove(&id);
        }
        self.items = snapshot;
    }
}

/// Service tying the gate, the lifecycle, and the backend together for
/// one acting session.
///
/// Generic over the backend implementation so tests can substitute an
/// in-memory one.
#[derive(Clone)]
pub struct ApprovalService<B: Backend> {
    backend: B,
    session: SessionContext,
}

impl<B: Backend> ApprovalService<B> {
    pub fn new(backend: B, session: SessionContext) -> Self {
        Self { backend, session }
    }

    /// Whether the current session may review requests in a domain. Used
    /// to gate navigation before any fetch happens.
    pub fn can_review(&self, domain: RequestDomain) -> Access {
        let session = self.session.current();
        authz::authorize_or_deny(session.as_ref(), required_reviewer_roles(domain))
    }

    /// Re-fetches the board's backing collection and reconciles it with
    /// any outstanding optimistic patches. Called on mount and on every
    /// poll tick.
    ///
    /// Dropping the returned future (view unmounted, navigation away)
    /// cancels the fetch before it touches the board; the snapshot is
    /// applied only after the await completes.
    pub async fn refresh(&self, board: &mut RequestBoard) -> Result<()> {
        let snapshot = self.backend.list_requests(board.domain()).await?;
        tracing::debug!(
            "🔄 Poll snapshot for {:?}: {} rows",
            board.domain(),
            snapshot.len()
        );
        board.reconcile(snapshot);
        Ok(())
    }

    /// Finalizes a pending request: gate, pure transition, persistence,
    /// then the optimistic board patch.
    ///
    /// Local validation failures (stale state, missing comment) never
    /// reach the network. The board is patched only after the backend
    /// accepted the decision; a failed call leaves it untouched.
    ///
    /// # Returns
    ///
    /// The backend's user-facing confirmation message.
    pub async fn decide(
        &self,
        board: &mut RequestBoard,
        request_id: i64,
        action: ReviewAction,
        comment: &str,
    ) -> Result<String> {
        let request = board
            .find(request_id)
            .cloned()
            .ok_or(AppError::AlreadyFinalized)?;

        let session = self.session.current();
        let next = lifecycle::transition(
            &request,
            action,
            comment,
            session.as_ref(),
            required_reviewer_roles(board.domain()),
        )?;

        let record = TransitionRecord {
            domain: board.domain(),
            request_id,
            action: board.domain().wire_action(action).to_string(),
            comment: comment.to_string(),
            reviewer: next.reviewer.clone().unwrap_or_default(),
            requester_email: request.requester.email.clone(),
        };

        let message = self.backend.persist_transition(&record).await?;
        board.apply_patch(next);
        Ok(message)
    }
}
