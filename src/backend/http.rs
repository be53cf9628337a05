//! HTTP implementation of the [`Backend`] trait over the ERP REST API.
//!
//! Bodies are decoded with sonic-rs from the raw response text so that the
//! embedded `status` field can be inspected before any success is assumed.

use std::time::Duration;

use serde::Deserialize;

use crate::backend::{Backend, LoginProfile, RequestDomain, TransitionRecord};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::request::{ApprovableRequest, RequestPayload, RequestStatus, Requester};
use crate::models::session::ResourceRef;
use crate::models::user::{DirectoryUser, RoleEntry};
use crate::services::query::parse_request_date;
use crate::services::session::SessionContext;
use crate::validation::Credentials;

/// Envelope carried by mutation endpoints and by error answers of the
/// fetch endpoints.
///
/// The backend is inconsistent about shape: success replies are HTTP 200
/// with either no `status` field at all (user domain) or
/// `status == "success"` (maestro). Failures are signalled by a non-2xx
/// code or `status == "error"`, with the text under `message` or `error`.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: String,
}

impl StatusEnvelope {
    /// The user-facing text, wherever the backend put it.
    fn text(&self) -> &str {
        if self.message.is_empty() {
            &self.error
        } else {
            &self.message
        }
    }

    /// True only for an explicit failure marker. A missing `status` or
    /// `status == "success"` is not a failure.
    fn is_failure(&self) -> bool {
        self.status == "error"
    }
}

#[derive(Debug, Deserialize)]
struct LoginWire {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    usuario: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    gerencia: Option<String>,
    #[serde(default)]
    estanques: Vec<ResourceRef>,
}

/// One row of `/get_solicitudes_usuario` or `/get_solicitudes_maestro`.
/// Columns are UPPER_SNAKE Spanish; detail columns vary per type and are
/// all optional here.
#[derive(Debug, Deserialize)]
struct SolicitudRow {
    #[serde(rename = "ID_SOLICITUD")]
    id: i64,
    #[serde(rename = "NUMERO_SOLICITUD", default)]
    numero: String,
    #[serde(rename = "TIPO_SOLICITUD", default)]
    tipo: String,
    #[serde(rename = "ESTADO_SOLICITUD", default)]
    estado: String,
    #[serde(rename = "NOMBRE_SOLICITANTE", default)]
    solicitante: String,
    #[serde(rename = "GERENCIA", default)]
    gerencia: String,
    #[serde(rename = "AREA", default)]
    area: String,
    #[serde(rename = "FECHA_SOLICITUD", default)]
    fecha: String,
    #[serde(rename = "COMENTARIO", default)]
    comentario: String,
    #[serde(rename = "EMAIL", default)]
    email: Option<String>,
    #[serde(rename = "APROBADO_POR", default)]
    aprobado_por: Option<String>,
    // User-request detail columns.
    #[serde(rename = "NOMBRE_COMPLETO", default)]
    nombre_completo: Option<String>,
    #[serde(rename = "RUT", default)]
    rut: Option<String>,
    #[serde(rename = "CARGO", default)]
    cargo: Option<String>,
    #[serde(rename = "ROL_PROPUESTO", default)]
    rol_propuesto: Option<String>,
    #[serde(rename = "ROL_ACTUAL", default)]
    rol_actual: Option<String>,
    #[serde(rename = "NOMBRE_USUARIO", default)]
    nombre_usuario: Option<String>,
    // Master-data detail columns.
    #[serde(rename = "DETALLE_SOLICITUD", default)]
    detalle: Option<String>,
    #[serde(rename = "UNIDAD_MEDIDA", default)]
    unidad_medida: Option<String>,
    #[serde(rename = "TIPO_MATERIAL", default)]
    tipo_material: Option<String>,
    #[serde(rename = "GRUPO_ARTICULO", default)]
    grupo_articulo: Option<String>,
    #[serde(rename = "CRITICIDAD", default)]
    criticidad: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsuarioWire {
    id: i64,
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    rut: Option<String>,
    #[serde(default)]
    gerencia: Option<String>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    cargo: Option<String>,
    #[serde(default)]
    nombre_usuario: Option<String>,
    #[serde(default)]
    rol: Option<String>,
    #[serde(default)]
    estado: String,
    #[serde(default)]
    estanques: Vec<EstanqueWire>,
}

#[derive(Debug, Deserialize)]
struct EstanqueWire {
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    ubicacion: String,
}

#[derive(Debug, Deserialize)]
struct RolWire {
    id: i64,
    #[serde(default)]
    nombre: String,
}

fn parse_status(raw: &str) -> RequestStatus {
    // The maestro update path writes "Aprobado"/"Rechazado" with mixed
    // case; compare case-insensitively.
    match raw.to_uppercase().as_str() {
        "APROBADO" => RequestStatus::Approved,
        "RECHAZADO" => RequestStatus::Rejected,
        _ => RequestStatus::Pending,
    }
}

impl SolicitudRow {
    fn into_request(self, domain: RequestDomain) -> ApprovableRequest {
        let payload = match domain {
            RequestDomain::MasterData => RequestPayload::MasterData {
                detail: self.detalle.unwrap_or_default(),
                unit_of_measure: self.unidad_medida,
                material_type: self.tipo_material,
                article_group: self.grupo_articulo,
                criticality: self.criticidad,
            },
            RequestDomain::UserAdmin => match self.tipo.as_str() {
                "Creación de Usuario" => RequestPayload::UserCreate {
                    full_name: self.nombre_completo.unwrap_or_default(),
                    rut: self.rut,
                    position: self.cargo,
                    proposed_role: self.rol_propuesto,
                    username: self.nombre_usuario,
                },
                "Modificación de Usuario" => RequestPayload::UserUpdate {
                    full_name: self.nombre_completo.unwrap_or_default(),
                    rut: self.rut,
                    current_role: self.rol_actual,
                    proposed_role: self.rol_propuesto,
                    username: self.nombre_usuario,
                },
                "Cambio de Estado de Usuario" => RequestPayload::UserStatusChange {
                    full_name: self.nombre_completo.unwrap_or_default(),
                    rut: self.rut,
                    username: self.nombre_usuario,
                },
                other => RequestPayload::Other {
                    kind_label: other.to_string(),
                },
            },
        };

        let review_comment = if self.comentario.trim().is_empty() {
            None
        } else {
            Some(self.comentario)
        };

        ApprovableRequest {
            id: self.id,
            request_number: self.numero,
            status: parse_status(&self.estado),
            requester: Requester {
                name: self.solicitante,
                area: self.area,
                management_unit: self.gerencia,
                email: self.email,
            },
            submitted_at: parse_request_date(&self.fecha),
            submitted_at_raw: self.fecha,
            payload,
            review_comment,
            reviewer: self.aprobado_por,
        }
    }
}

/// REST client for the ERP backend.
///
/// Reads the bearer token from the live session on every call, the same
/// way the original client attached it per request.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl HttpBackend {
    /// Creates a new `HttpBackend`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `session` - The session context the bearer token is read from.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `HttpBackend`.
    pub fn new(config: &Config, session: SessionContext) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client build error: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches `Authorization: Bearer <token>` when a session exists.
    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.current() {
            Some(session) => req.bearer_auth(session.token),
            None => req,
        }
    }

    /// Reads a response body, surfacing an embedded failure status before
    /// decoding into the expected shape.
    async fn decode<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T> {
        let http_status = resp.status();
        let body = resp.text().await?;

        if !http_status.is_success() {
            let text = sonic_rs::from_str::<StatusEnvelope>(&body)
                .map(|env| env.text().to_string())
                .unwrap_or_default();

            // 5xx is transient and retryable; a 4xx with a body message is
            // an application-level refusal to surface verbatim.
            if http_status.is_server_error() {
                let detail = if text.is_empty() {
                    format!("HTTP {}", http_status)
                } else {
                    text
                };
                return Err(AppError::BackendUnavailable(detail));
            }
            if !text.is_empty() {
                return Err(AppError::ApplicationRejected(text));
            }
            return Err(AppError::BackendUnavailable(format!(
                "HTTP {}",
                http_status
            )));
        }

        sonic_rs::from_str(&body).map_err(|e| AppError::Decode(e.to_string()))
    }

    async fn fetch_rows(&self, path: &str, domain: RequestDomain) -> Result<Vec<ApprovableRequest>> {
        tracing::debug!("📥 Fetching {}", path);
        let resp = self.with_auth(self.client.get(self.url(path))).send().await?;
        let rows: Vec<SolicitudRow> = Self::decode(resp).await?;
        Ok(rows.into_iter().map(|r| r.into_request(domain)).collect())
    }
}

impl Backend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginProfile> {
        tracing::debug!("🔐 Login attempt for RUT: {}", credentials.rut);

        let body = sonic_rs::json!({
            "rut": credentials.rut,
            "password": credentials.password.as_str(),
        });

        let resp = self
            .client
            .post(self.url("/login"))
            .header("Content-Type", "application/json")
            .body(sonic_rs::to_string(&body).map_err(|e| AppError::Internal(e.to_string()))?)
            .send()
            .await?;

        let http_status = resp.status();
        if http_status.is_server_error() {
            return Err(AppError::BackendUnavailable(format!("HTTP {}", http_status)));
        }

        let text = resp.text().await?;
        let wire: LoginWire = sonic_rs::from_str(&text).map_err(|e| {
            if http_status.is_success() {
                AppError::Decode(e.to_string())
            } else {
                AppError::Authentication("Credenciales incorrectas o usuario no válido".to_string())
            }
        })?;

        if wire.status != "ok" {
            let message = if wire.message.is_empty() {
                "Credenciales inválidas".to_string()
            } else {
                wire.message
            };
            return Err(AppError::Authentication(message));
        }

        Ok(LoginProfile {
            token: wire.token,
            user_name: wire.usuario,
            roles: wire.roles,
            email: wire.email,
            area: wire.area,
            management_unit: wire.gerencia,
            assigned_resources: wire.estanques,
        })
    }

    async fn list_requests(&self, domain: RequestDomain) -> Result<Vec<ApprovableRequest>> {
        match domain {
            RequestDomain::UserAdmin => {
                self.fetch_rows("/get_solicitudes_usuario", domain).await
            }
            RequestDomain::MasterData => {
                self.fetch_rows("/get_solicitudes_maestro", domain).await
            }
        }
    }

    async fn persist_transition(&self, record: &TransitionRecord) -> Result<String> {
        let body = sonic_rs::json!({
            "id_solicitud": record.request_id,
            "accion": record.action,
            "comentario": record.comment,
            "aprobado_por": record.reviewer,
            "emailSolicitante": record.requester_email,
        });
        let payload =
            sonic_rs::to_string(&body).map_err(|e| AppError::Internal(e.to_string()))?;

        // The user-admin endpoint is a PUT, the maestro one a POST.
        let req = match record.domain {
            RequestDomain::UserAdmin => self.client.put(self.url("/update_solicitud_usuario")),
            RequestDomain::MasterData => self.client.post(self.url("/update_solicitud_maestro")),
        };

        let resp = self
            .with_auth(req.header("Content-Type", "application/json").body(payload))
            .send()
            .await?;

        let env: StatusEnvelope = Self::decode(resp).await?;
        if env.is_failure() {
            tracing::warn!(
                "❌ Backend rejected transition for solicitud {}: {}",
                record.request_id,
                env.text()
            );
            return Err(AppError::ApplicationRejected(env.text().to_string()));
        }

        tracing::info!("✅ Transition persisted for solicitud {}", record.request_id);
        Ok(env.text().to_string())
    }

    async fn list_users(&self) -> Result<Vec<DirectoryUser>> {
        let resp = self
            .with_auth(self.client.get(self.url("/get_usuarios")))
            .send()
            .await?;
        let rows: Vec<UsuarioWire> = Self::decode(resp).await?;

        Ok(rows
            .into_iter()
            .map(|u| DirectoryUser {
                id: u.id,
                full_name: u.nombre,
                rut: u.rut,
                email: u.email,
                management_unit: u.gerencia,
                area: u.area,
                position: u.cargo,
                username: u.nombre_usuario,
                role: u.rol,
                is_active: u.estado == "Activo",
                assigned_resources: u
                    .estanques
                    .into_iter()
                    .map(|e| ResourceRef {
                        codigo: e.ubicacion,
                        nombre: e.nombre,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn list_roles(&self) -> Result<Vec<RoleEntry>> {
        let resp = self
            .with_auth(self.client.get(self.url("/get_roles")))
            .send()
            .await?;
        let rows: Vec<RolWire> = Self::decode(resp).await?;
        Ok(rows
            .into_iter()
            .map(|r| RoleEntry {
                id: r.id,
                name: r.nombre,
            })
            .collect())
    }
}
