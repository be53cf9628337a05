//! The approval state machine: PENDING → APPROVED | REJECTED.
//!
//! `transition` is pure: it decides legality and returns a new record;
//! persisting the decision and patching the in-memory collection belong to
//! the caller (see `services::approvals`).

use std::cmp::Ordering;

use crate::error::{AppError, Result};
use crate::models::request::{ApprovableRequest, RequestStatus, ReviewAction};
use crate::models::session::Session;
use crate::services::authz;
use crate::validation;

/// Applies a reviewer decision to a pending request.
///
/// Preconditions, checked in order:
/// 1. the request is still PENDING, else `AlreadyFinalized`;
/// 2. the acting session holds one of `required_roles`, else
///    `Unauthenticated`/`Forbidden`;
/// 3. a reject carries a non-blank comment, else `MissingComment`.
///
/// On success returns a new record with the target status, the comment,
/// and the acting user recorded as reviewer. The input is not mutated.
pub fn transition(
    request: &ApprovableRequest,
    action: ReviewAction,
    comment: &str,
    acting_session: Option<&Session>,
    required_roles: &[&str],
) -> Result<ApprovableRequest> {
    if request.status.is_terminal() {
        tracing::debug!(
            "Solicitud {} already finalized as {:?}",
            request.id,
            request.status
        );
        return Err(AppError::AlreadyFinalized);
    }

    authz::authorize_or_deny(acting_session, required_roles).into_result()?;

    if action == ReviewAction::Reject {
        validation::validate_reject_comment(comment)?;
    }

    // Checked above: the authorize call only passes with a session.
    let reviewer = acting_session
        .map(|s| s.user_name.clone())
        .ok_or(AppError::Unauthenticated)?;

    let mut next = request.clone();
    next.status = action.target_status();
    next.review_comment = Some(comment.to_string());
    next.reviewer = Some(reviewer);

    tracing::info!(
        "📋 Solicitud {} transitioned to {:?} by {}",
        next.id,
        next.status,
        next.reviewer.as_deref().unwrap_or("?")
    );
    Ok(next)
}

/// Canonical presentation order for request collections: pending requests
/// ahead of terminal ones, then submission date ascending (oldest first).
///
/// Returns `Ordering::Equal` for ties so that a stable sort preserves the
/// incoming relative order.
pub fn presentation_order(a: &ApprovableRequest, b: &ApprovableRequest) -> Ordering {
    let a_pending = a.status == RequestStatus::Pending;
    let b_pending = b.status == RequestStatus::Pending;
    b_pending
        .cmp(&a_pending)
        .then_with(|| a.effective_date().cmp(&b.effective_date()))
}
