//! HTTP boundary: axum router, handlers, and the error-to-response mapping.
//!
//! Routes and status codes preserve the portal's historical REST contract:
//!
//! - `GET  /api/flexes`                      → period list
//! - `GET  /api/flexes/{flexId}`             → period detail
//! - `POST /api/flexes/{flexId}/{optionId}`  → register the calling student
//!
//! Not-found failures map to 404, availability/capacity/validation failures
//! to 400. Every error body carries a machine-readable `code` from the
//! registry error catalog alongside the human-readable message.
//!
//! Identity: the session gateway in front of this service authenticates the
//! student and forwards the verified id in the `x-student-id` header; the
//! handlers treat that header as trusted input and never authenticate
//! themselves.

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{async_trait, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use flexreg_store::StorageBackend;
use flexreg_types::{OptionId, PeriodId, RegistrationStatus, RegistryError, StudentId};

use crate::service::RegistrationService;

/// Header carrying the verified student identity, set by the session gateway.
pub const STUDENT_ID_HEADER: &str = "x-student-id";

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code from the registry error catalog.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

/// Successful registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Always `true`; failures are reported as error responses.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

/// Wrapper mapping [`RegistryError`] onto HTTP responses.
pub struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code().as_u16();
        let (status, message) = match &self.0 {
            RegistryError::PeriodNotFound { .. } => {
                (StatusCode::NOT_FOUND, "Flex period not found".to_string())
            }
            RegistryError::OptionNotFound { .. } => {
                (StatusCode::NOT_FOUND, "Flex option not found".to_string())
            }
            RegistryError::PeriodNotAvailable { .. } => (
                StatusCode::BAD_REQUEST,
                "Registration not available for this flex period".to_string(),
            ),
            RegistryError::OptionFull { .. } => {
                (StatusCode::BAD_REQUEST, "Registration failed: Slot is full.".to_string())
            }
            RegistryError::InvalidIdentifier { field, .. } => {
                (StatusCode::BAD_REQUEST, format!("Invalid {field}"))
            }
            RegistryError::Contention { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Registration is busy, please try again.".to_string(),
            ),
            err => {
                // Storage/codec/config/IO details stay in the logs, not in
                // client responses.
                error!(error = %err, "internal error serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(ErrorBody { code, message })).into_response()
    }
}

/// The authenticated student, extracted from [`STUDENT_ID_HEADER`].
///
/// Requests without a parsable header are rejected with 401 before any
/// handler logic runs.
pub struct AuthenticatedStudent(pub StudentId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedStudent {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(STUDENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing student identity"))?;
        let student_id =
            header.parse::<StudentId>().map_err(|_| unauthorized("Invalid student identity"))?;
        Ok(Self(student_id))
    }
}

fn unauthorized(message: &str) -> Response {
    let code = flexreg_types::ErrorCode::InvalidIdentifier.as_u16();
    (StatusCode::UNAUTHORIZED, Json(ErrorBody { code, message: message.to_string() }))
        .into_response()
}

/// Parses a path segment into a typed identifier, failing fast with a typed
/// error instead of propagating a coercion failure into the store.
fn parse_id<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| {
        ApiError(RegistryError::InvalidIdentifier {
            field: field.to_string(),
            value: raw.to_string(),
        })
    })
}

/// Builds the application router over a registration service.
pub fn router<B>(service: RegistrationService<B>) -> Router
where
    B: StorageBackend + 'static,
{
    Router::new()
        .route("/api/flexes", get(list_periods::<B>))
        .route("/api/flexes/:flex_id", get(period_detail::<B>))
        .route("/api/flexes/:flex_id/:option_id", post(register::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// `GET /api/flexes` — all periods with name and status.
async fn list_periods<B: StorageBackend + 'static>(
    State(service): State<RegistrationService<B>>,
) -> impl IntoResponse {
    Json(service.period_summaries())
}

/// `GET /api/flexes/{flexId}` — one period with its options, for display.
async fn period_detail<B: StorageBackend + 'static>(
    State(service): State<RegistrationService<B>>,
    Path(flex_id): Path<String>,
) -> Result<Response, ApiError> {
    let period_id: PeriodId = parse_id("flexId", &flex_id)?;
    let detail = service.period_detail(period_id)?;
    Ok(Json(detail).into_response())
}

/// `POST /api/flexes/{flexId}/{optionId}` — register the calling student.
async fn register<B: StorageBackend + 'static>(
    State(service): State<RegistrationService<B>>,
    Path((flex_id, option_id)): Path<(String, String)>,
    AuthenticatedStudent(student_id): AuthenticatedStudent,
) -> Result<Response, ApiError> {
    let period_id: PeriodId = parse_id("flexId", &flex_id)?;
    let option_id: OptionId = parse_id("optionId", &option_id)?;

    let registration = service.register(student_id, period_id, option_id)?;
    let message = match registration.status {
        RegistrationStatus::Unchanged => "Already registered.".to_string(),
        _ => "Successfully registered.".to_string(),
    };
    Ok(Json(RegisterResponse { success: true, message }).into_response())
}
