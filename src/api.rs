// 🌐 REST API for conversion records (Axum)
// Records are create/read/delete only: the words are derived server-side
// and nothing can change a record after it has been stored.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::db::{
    create_conversion, delete_conversion, get_all_conversions, get_conversion,
    get_events_for_entity, Conversion, Event, ENTITY_CONVERSION,
};
use crate::validation::{parse_input_number, validate_input_number, ValidationError};
use crate::words;

const API_ACTOR: &str = "api";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Field name → messages
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: String, errors: Option<BTreeMap<String, Vec<String>>>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            errors,
        }
    }
}

/// Result of a one-off conversion (nothing stored)
#[derive(Serialize)]
struct ConvertResponse {
    input_number: i64,
    output_words: String,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    /// Body could not be read as JSON (400 malformed, 415 wrong content type)
    BadRequest { status: StatusCode, message: String },
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<words::ConversionError> for ApiError {
    fn from(err: words::ConversionError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => {
                warn!("rejected input: {}", err);
                let mut errors = BTreeMap::new();
                errors.insert(err.field.clone(), vec![err.message.clone()]);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::failure(err.to_string(), Some(errors))),
                )
                    .into_response()
            }
            ApiError::BadRequest { status, message } => {
                warn!("rejected body: {}", message);
                (status, Json(ApiResponse::failure(message, None))).into_response()
            }
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::failure(format!("Conversion {} not found", id), None)),
            )
                .into_response(),
            ApiError::Internal(err) => {
                error!("internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::failure("Internal server error".to_string(), None)),
                )
                    .into_response()
            }
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/conversions - All conversions, oldest first
async fn list_conversions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Conversion>>>, ApiError> {
    let conn = state.conn()?;
    let conversions = get_all_conversions(&conn)?;
    Ok(Json(ApiResponse::ok(conversions)))
}

/// POST /api/conversions - Create a conversion from `{"input_number": n}`
///
/// Any client-supplied `output_words` is ignored.
async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let input_number = validate_input_number(body.get("input_number"))?;

    let conn = state.conn()?;
    let conversion = create_conversion(&conn, input_number, API_ACTOR)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(conversion))))
}

/// GET /api/conversions/:id
async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Conversion>>, ApiError> {
    let conn = state.conn()?;
    match get_conversion(&conn, &id)? {
        Some(conversion) => Ok(Json(ApiResponse::ok(conversion))),
        None => Err(ApiError::NotFound(id)),
    }
}

/// DELETE /api/conversions/:id
async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.conn()?;
    if delete_conversion(&conn, &id, API_ACTOR)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(id))
    }
}

/// GET /api/conversions/:id/events - Audit trail (kept after deletion)
async fn conversion_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let conn = state.conn()?;
    let events = get_events_for_entity(&conn, ENTITY_CONVERSION, &id)?;
    if events.is_empty() {
        return Err(ApiError::NotFound(id));
    }
    Ok(Json(ApiResponse::ok(events)))
}

/// GET /api/convert/:number - Convert without storing
async fn convert_number(Path(raw): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let input_number = parse_input_number(&raw)?;
    let output_words = words::convert(input_number)?;

    Ok(Json(ApiResponse::ok(ConvertResponse {
        input_number,
        output_words,
    })))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/conversions", get(list_conversions).post(create))
        .route("/conversions/:id", get(retrieve).delete(destroy))
        .route("/conversions/:id/events", get(conversion_events))
        .route("/convert/:number", get(convert_number))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
