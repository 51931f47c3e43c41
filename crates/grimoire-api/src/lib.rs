//! # grimoire-api
//!
//! HTTP surface for categories and wizards: router, shared state, and the
//! mapping from core errors to responses. The binary in `main.rs` wires
//! configuration, logging and the store around [`build_router`].

pub mod config;
pub mod handlers;
pub mod services;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};
use uuid::Uuid;

use grimoire_core::defaults::WIZARD_LIST_PATH;
use grimoire_core::validation::ValidationRules;
use grimoire_core::Store;

use config::ApiConfig;
use handlers::{categories, wizards};
use services::{CategoryService, WizardService};

/// Request ID generator using UUIDv7 (time-ordered).
#[derive(Clone, Copy)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub categories: CategoryService,
    pub wizards: WizardService,
    /// Prefix for pagination `Link` URLs; empty yields relative links.
    pub public_url: String,
}

impl AppState {
    pub fn new(store: Store, config: &ApiConfig) -> Self {
        let rules = ValidationRules {
            content_min_len: config.content_min_len,
        };
        Self {
            categories: CategoryService::new(&store, config.delete_policy),
            wizards: WizardService::new(&store, rules),
            public_url: config.public_url.clone(),
            store,
        }
    }
}

/// Turn configured origins into header values, skipping unparseable ones.
pub fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Build the full router with middleware.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/categorys", axum::routing::post(categories::create_category))
        .route(
            "/api/categorys/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            WIZARD_LIST_PATH,
            get(wizards::list_wizards)
                .post(wizards::create_wizard)
                .put(wizards::reject_collection_write)
                .delete(wizards::reject_collection_write),
        )
        .route(
            "/api/wizards/:id",
            get(wizards::get_wizard)
                .put(wizards::update_wizard)
                .delete(wizards::delete_wizard),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .expose_headers([header::LINK])
                .max_age(Duration::from_secs(3600)),
        )
        .with_state(state)
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    let healthy = match state.store.health.health_check().await {
        Ok(up) => up,
        Err(e) => {
            warn!(subsystem = "api", op = "health_check", error = %e, "Health check failed");
            false
        }
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Decode a JSON request body. An empty body decodes as `T::default()`.
pub(crate) fn parse_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<grimoire_core::Error> for ApiError {
    fn from(err: grimoire_core::Error) -> Self {
        use grimoire_core::Error;
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::CategoryNotFound(id) => ApiError::NotFound(format!("Category {} not found", id)),
            Error::WizardNotFound(id) => ApiError::NotFound(format!("Wizard {} not found", id)),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                error!(subsystem = "api", error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
