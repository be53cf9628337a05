use chrono::Utc;
use uuid::Uuid;

use opsflow::models::request::{ApprovableRequest, RequestPayload, RequestStatus, Requester};
use opsflow::models::session::{LandingRoute, Session, landing_route};
use opsflow::services::authz::{Access, DenyReason, authorize_or_deny, can_perform};
use opsflow::services::lifecycle::transition;
use opsflow::services::query::parse_request_date;
use opsflow::{AppError, ReviewAction};

fn make_session(roles: &[&str]) -> Session {
    Session {
        id: Uuid::new_v4(),
        user_name: "Patricia Reyes".to_string(),
        email: "preyes@cmsg.cl".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        area: Some("TI".to_string()),
        management_unit: Some("Gerencia TI".to_string()),
        assigned_resources: Vec::new(),
        token: "token-abc".to_string(),
        created_at: Utc::now(),
    }
}

fn make_request(status: RequestStatus) -> ApprovableRequest {
    ApprovableRequest {
        id: 7,
        request_number: "SOL-0007".to_string(),
        status,
        requester: Requester {
            name: "Juan Soto".to_string(),
            area: "Operaciones".to_string(),
            management_unit: "Gerencia Mina".to_string(),
            email: Some("jsoto@cmsg.cl".to_string()),
        },
        submitted_at: parse_request_date("15/02/2024"),
        submitted_at_raw: "15/02/2024".to_string(),
        payload: RequestPayload::UserUpdate {
            full_name: "Juan Soto".to_string(),
            rut: Some("9.876.543-2".to_string()),
            current_role: Some("SOLICITANTE".to_string()),
            proposed_role: Some("COMPRAS".to_string()),
            username: Some("jsoto".to_string()),
        },
        review_comment: None,
        reviewer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_role_set_is_never_authorized() {
        let session = make_session(&[]);
        assert!(!can_perform(Some(&session), &[]));
        assert!(!can_perform(Some(&session), &["ADMIN_TI"]));
        assert_eq!(
            authorize_or_deny(Some(&session), &["ADMIN_TI"]),
            Access::Denied(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        assert!(!can_perform(None, &[]));
        assert_eq!(
            authorize_or_deny(None, &["ADMIN_TI"]),
            Access::Denied(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn wrong_role_is_insufficient() {
        // SOLICITANTE asking for an ADMIN_TI-gated operation.
        let session = make_session(&["SOLICITANTE"]);
        assert!(!can_perform(Some(&session), &["ADMIN_TI"]));
        assert_eq!(
            authorize_or_deny(Some(&session), &["ADMIN_TI"]),
            Access::Denied(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn empty_required_roles_admits_any_authenticated_session() {
        let session = make_session(&["BODEGA"]);
        assert!(can_perform(Some(&session), &[]));
    }

    #[test]
    fn role_intersection_admits() {
        let session = make_session(&["COMPRAS", "SOLICITANTE"]);
        assert!(can_perform(Some(&session), &["ADMIN_TI", "COMPRAS"]));
    }

    #[test]
    fn approve_produces_new_finalized_record() {
        let request = make_request(RequestStatus::Pending);
        let session = make_session(&["ADMIN_TI"]);

        let next = transition(
            &request,
            ReviewAction::Approve,
            "todo en orden",
            Some(&session),
            &["ADMIN_TI"],
        )
        .unwrap();

        assert_eq!(next.status, RequestStatus::Approved);
        assert_eq!(next.review_comment.as_deref(), Some("todo en orden"));
        assert_eq!(next.reviewer.as_deref(), Some("Patricia Reyes"));
        // The input record is untouched.
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.reviewer.is_none());
    }

    #[test]
    fn reject_with_blank_comment_fails_locally() {
        let request = make_request(RequestStatus::Pending);
        let session = make_session(&["ADMIN_TI"]);

        for comment in ["", "   ", "\t\n"] {
            let err = transition(
                &request,
                ReviewAction::Reject,
                comment,
                Some(&session),
                &[],
            )
            .unwrap_err();
            assert!(matches!(err, AppError::MissingComment));
        }
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn terminal_requests_cannot_transition_regardless_of_arguments() {
        let session = make_session(&["ADMIN_TI"]);
        for status in [RequestStatus::Approved, RequestStatus::Rejected] {
            let request = make_request(status);
            let err = transition(
                &request,
                ReviewAction::Approve,
                "da igual",
                Some(&session),
                &["ADMIN_TI"],
            )
            .unwrap_err();
            assert!(matches!(err, AppError::AlreadyFinalized));
        }
    }

    #[test]
    fn finalized_check_precedes_authorization() {
        // An unauthenticated caller on a terminal request sees the stale
        // state, not the authorization failure.
        let request = make_request(RequestStatus::Approved);
        let err =
            transition(&request, ReviewAction::Approve, "", None, &["ADMIN_TI"]).unwrap_err();
        assert!(matches!(err, AppError::AlreadyFinalized));
    }

    #[test]
    fn unauthorized_reviewer_is_refused_before_comment_check() {
        let request = make_request(RequestStatus::Pending);
        let session = make_session(&["SOLICITANTE"]);
        // Blank comment AND wrong role: Forbidden wins per precondition
        // order.
        let err = transition(
            &request,
            ReviewAction::Reject,
            "",
            Some(&session),
            &["ADMIN_TI"],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn landing_route_follows_role_precedence() {
        let cases = [
            (vec!["ADMIN_TI", "COMPRAS"], LandingRoute::AdminDashboard),
            (vec!["COMPRAS", "BODEGA"], LandingRoute::BuyersDashboard),
            (vec!["BODEGA"], LandingRoute::FuelRequest),
            (vec!["SOLICITANTE"], LandingRoute::RequestMain),
            (vec!["OTRO_ROL"], LandingRoute::Home),
        ];
        for (roles, expected) in cases {
            let refs: Vec<&str> = roles.iter().map(|s| *s).collect();
            let session = make_session(&refs);
            assert_eq!(landing_route(&session), expected, "roles {:?}", roles);
        }
    }
}
