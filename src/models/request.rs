use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The lifecycle state of an approvable request.
///
/// `Pending` is the only state a transition may start from; `Approved` and
/// `Rejected` are terminal. Terminal requests are retained for audit, never
/// deleted from the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "APROBADO")]
    Approved,
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// The backend's spelling of this status.
    pub fn as_wire(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDIENTE",
            RequestStatus::Approved => "APROBADO",
            RequestStatus::Rejected => "RECHAZADO",
        }
    }
}

/// A reviewer's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    /// The terminal status this action moves the request to.
    pub fn target_status(&self) -> RequestStatus {
        match self {
            ReviewAction::Approve => RequestStatus::Approved,
            ReviewAction::Reject => RequestStatus::Rejected,
        }
    }
}

/// The person who submitted a request, as the backend reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub name: String,
    pub area: String,
    pub management_unit: String,
    pub email: Option<String>,
}

/// Type-specific request content.
///
/// Each variant defines its own display field set; transition rules never
/// look at the payload, so adding a variant never touches the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RequestPayload {
    /// "Creación de Usuario": a new system account.
    UserCreate {
        full_name: String,
        rut: Option<String>,
        position: Option<String>,
        proposed_role: Option<String>,
        username: Option<String>,
    },
    /// "Modificación de Usuario": a role change on an existing account.
    UserUpdate {
        full_name: String,
        rut: Option<String>,
        current_role: Option<String>,
        proposed_role: Option<String>,
        username: Option<String>,
    },
    /// "Cambio de Estado de Usuario": enable/disable an account.
    UserStatusChange {
        full_name: String,
        rut: Option<String>,
        username: Option<String>,
    },
    /// A product master-data request.
    MasterData {
        detail: String,
        unit_of_measure: Option<String>,
        material_type: Option<String>,
        article_group: Option<String>,
        criticality: Option<String>,
    },
    /// A request type this client has no dedicated rendering for.
    Other { kind_label: String },
}

impl RequestPayload {
    /// Human-facing label for the request type, matching the backend's
    /// `TIPO_SOLICITUD` strings.
    pub fn type_label(&self) -> &str {
        match self {
            RequestPayload::UserCreate { .. } => "Creación de Usuario",
            RequestPayload::UserUpdate { .. } => "Modificación de Usuario",
            RequestPayload::UserStatusChange { .. } => "Cambio de Estado de Usuario",
            RequestPayload::MasterData { .. } => "Solicitud de Maestro",
            RequestPayload::Other { kind_label } => kind_label,
        }
    }

    /// The label/value pairs a detail card renders for this variant.
    ///
    /// Absent optional fields render as "No especificado", as the original
    /// screens do.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        fn or_unspecified(v: &Option<String>) -> String {
            v.clone().unwrap_or_else(|| "No especificado".to_string())
        }

        match self {
            RequestPayload::UserCreate {
                full_name,
                rut,
                position,
                proposed_role,
                ..
            } => vec![
                ("Usuario a Crear", full_name.clone()),
                ("RUT", or_unspecified(rut)),
                ("Cargo", or_unspecified(position)),
                ("Rol Propuesto", or_unspecified(proposed_role)),
            ],
            RequestPayload::UserUpdate {
                full_name,
                rut,
                current_role,
                proposed_role,
                ..
            } => vec![
                ("Usuario a Modificar", full_name.clone()),
                ("RUT", or_unspecified(rut)),
                ("Rol Actual", or_unspecified(current_role)),
                ("Rol Propuesto", or_unspecified(proposed_role)),
            ],
            RequestPayload::UserStatusChange {
                full_name,
                rut,
                username,
            } => vec![
                ("Usuario", full_name.clone()),
                ("RUT", or_unspecified(rut)),
                ("Nombre de Usuario", or_unspecified(username)),
            ],
            RequestPayload::MasterData {
                detail,
                unit_of_measure,
                material_type,
                article_group,
                criticality,
            } => vec![
                ("Detalle", detail.clone()),
                ("Unidad de Medida", or_unspecified(unit_of_measure)),
                ("Tipo de Material", or_unspecified(material_type)),
                ("Grupo de Artículo", or_unspecified(article_group)),
                ("Criticidad", or_unspecified(criticality)),
            ],
            RequestPayload::Other { kind_label } => {
                vec![("Tipo", kind_label.clone())]
            }
        }
    }
}

impl RequestPayload {
    /// The name a text search should match against, when the variant has
    /// one (the affected user, or the requested item's detail line).
    pub fn primary_name(&self) -> Option<&str> {
        match self {
            RequestPayload::UserCreate { full_name, .. }
            | RequestPayload::UserUpdate { full_name, .. }
            | RequestPayload::UserStatusChange { full_name, .. } => Some(full_name),
            RequestPayload::MasterData { detail, .. } => Some(detail),
            RequestPayload::Other { .. } => None,
        }
    }
}

/// One unit of work requiring approval.
///
/// Created by submission elsewhere; mutated only through
/// `lifecycle::transition`, which returns a new record instead of mutating
/// in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovableRequest {
    /// Backend-assigned unique id.
    pub id: i64,
    /// Human-facing correlation id, unique per request.
    pub request_number: String,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Who submitted the request.
    pub requester: Requester,
    /// Submission date, when the backend's `DD/MM/YYYY` string parsed.
    pub submitted_at: Option<NaiveDate>,
    /// The raw submission date string as the backend sent it.
    pub submitted_at_raw: String,
    /// Type-specific content.
    pub payload: RequestPayload,
    /// Reviewer comment; required (non-blank) whenever status is Rejected.
    pub review_comment: Option<String>,
    /// The user name of whoever finalized the request.
    pub reviewer: Option<String>,
}

impl ApprovableRequest {
    /// Submission date used for ordering and date-range filters.
    ///
    /// Unparseable dates collapse to `NaiveDate::MIN`: they sort first
    /// within their status group and fail any `date_from` bound.
    pub fn effective_date(&self) -> NaiveDate {
        self.submitted_at.unwrap_or(NaiveDate::MIN)
    }
}

impl crate::models::query::Searchable for ApprovableRequest {
    /// Matches the original dashboards: requester name, affected
    /// user/item name, and the request number.
    fn searchable_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.requester.name.as_str(), self.request_number.as_str()];
        if let Some(name) = self.payload.primary_name() {
            fields.push(name);
        }
        fields
    }

    fn status_key(&self) -> Option<RequestStatus> {
        Some(self.status)
    }

    fn type_key(&self) -> Option<&str> {
        Some(self.payload.type_label())
    }

    fn date_key(&self) -> Option<NaiveDate> {
        Some(self.effective_date())
    }
}
