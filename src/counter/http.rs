// SPDX-License-Identifier: GPL-3.0-only

//! HTTP surface of the counter service
//!
//! | Method | Path                              | Response            |
//! |--------|-----------------------------------|---------------------|
//! | GET    | `<prefix>/health`                 | `{"status": "ok"}`  |
//! | GET    | `<prefix>/capture-count`          | `{"count": n}`      |
//! | POST   | `<prefix>/capture-count/increment`| `{"count": n + 1}`  |
//!
//! Every route needs `Authorization: Bearer <api key>`. Cross-origin requests
//! are accepted from any origin.

use super::service::CounterService;
use super::{CountResponse, ErrorResponse, HealthResponse};
use crate::config::ServerConfig;
use crate::errors::CounterError;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

#[derive(Clone)]
struct ApiState {
    service: CounterService,
    api_key: Arc<str>,
}

/// Error body plus status code
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Normalise a configured prefix to `/segment[/segment...]`, or empty for the root
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Build the router for `service`
pub fn router(service: CounterService, config: &ServerConfig) -> Router {
    let state = ApiState {
        service,
        api_key: Arc::from(config.api_key.as_str()),
    };

    let routes = Router::new()
        .route("/health", get(health))
        .route("/capture-count", get(get_count))
        .route("/capture-count/increment", post(increment_count))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state);

    let prefix = normalize_prefix(&config.path_prefix);
    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    };

    app.layer(TraceLayer::new_for_http()).layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(600))
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    let value = value?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

async fn require_bearer(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    let rejection = match bearer_token(request.headers().get(header::AUTHORIZATION)) {
        Some(token) if token == &*state.api_key => None,
        Some(_) => Some("Invalid authorization"),
        None => Some("Missing authorization header"),
    };

    match rejection {
        None => next.run(request).await,
        Some(message) => {
            debug!(path = %request.uri().path(), reason = message, "Rejected request");
            ApiError::new(StatusCode::UNAUTHORIZED, message).into_response()
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Run a store call on the blocking pool
async fn run_blocking<F>(f: F) -> Result<u64, CounterError>
where
    F: FnOnce() -> Result<u64, CounterError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CounterError::Store(format!("Counter task error: {}", e)))?
}

async fn get_count(State(state): State<ApiState>) -> Result<Json<CountResponse>, ApiError> {
    let service = state.service.clone();
    match run_blocking(move || service.get_count()).await {
        Ok(count) => Ok(Json(CountResponse { count })),
        Err(e) => {
            error!(error = %e, "Error getting capture count");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get capture count",
            ))
        }
    }
}

async fn increment_count(State(state): State<ApiState>) -> Result<Json<CountResponse>, ApiError> {
    let service = state.service.clone();
    match run_blocking(move || service.increment_count()).await {
        Ok(count) => Ok(Json(CountResponse { count })),
        Err(e) => {
            error!(error = %e, "Error incrementing capture count");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to increment capture count",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_normalised() {
        assert_eq!(normalize_prefix("/photobooth"), "/photobooth");
        assert_eq!(normalize_prefix("photobooth/"), "/photobooth");
        assert_eq!(normalize_prefix("/a/b/"), "/a/b");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn bearer_token_parsing() {
        let ok = HeaderValue::from_static("Bearer abc");
        let lower = HeaderValue::from_static("bearer abc");
        let basic = HeaderValue::from_static("Basic abc");

        assert_eq!(bearer_token(Some(&ok)), Some("abc"));
        assert_eq!(bearer_token(Some(&lower)), Some("abc"));
        assert_eq!(bearer_token(Some(&basic)), None);
        assert_eq!(bearer_token(None), None);
    }
}
