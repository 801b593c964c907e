//! HTTP transport for the analysis service.
//!
//! Axum router with a rate-limit middleware in front of the analyze route,
//! permissive CORS, and JSON error envelopes. The process-wide context is
//! built once at startup and injected as state; nothing here is a global.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{ConnectInfo, Extension, Request, State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use crate::analysis::AnalysisEngine;
use crate::clients::{self, TextGenerator};
use crate::config::Config;
use crate::error::{FrameAuditError, Result};
use crate::model::{ErrorBody, ErrorCode};
use crate::rate_limit::RateLimiter;

/// Process-wide context, constructed once at startup and passed into every
/// handler through axum state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub engine: Arc<AnalysisEngine>,
    pub limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Builds the context with the generator the configuration selects.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let generator = clients::create_generator(&config.llm)?;
        Ok(Self::with_generator(config, generator))
    }

    /// Builds the context around an explicit generator. Used by tests to
    /// inject scripted backends.
    pub fn with_generator(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let engine = Arc::new(AnalysisEngine::new(&config.input, generator));
        let limiter = Arc::new(RateLimiter::new(
            Duration::from_millis(config.rate_limit.window_ms),
            config.rate_limit.max_requests,
        ));
        Self {
            config: Arc::new(config),
            engine,
            limiter,
        }
    }
}

/// Caller identifier resolved by the rate-limit middleware, stashed for
/// handlers to log.
#[derive(Clone)]
struct ClientId(String);

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    scenario: String,
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .route("/", get(health_handler))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            rate_limit_middleware,
        ))
        // Outermost layer: answers CORS preflight before rate limiting
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(ctx)
}

/// Start the HTTP server
pub async fn start_http_server(ctx: AppContext) -> Result<()> {
    let bind = ctx.config.runtime.http_bind;
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| FrameAuditError::Internal {
            message: format!("Failed to bind HTTP listener: {e}"),
        })?;

    tracing::info!("frame-audit listening on {}", bind);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| FrameAuditError::Internal {
        message: format!("HTTP server error: {e}"),
    })?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

async fn rate_limit_middleware(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path == "/" || path == "/health" {
        return next.run(request).await;
    }

    let identifier = client_identifier(&request);

    // Check-then-record is deliberately not atomic; see rate_limit.rs
    if !ctx.limiter.check_limit(&identifier).await {
        let retry_after = ctx.limiter.time_until_reset(&identifier).await;
        let retry_secs = retry_after.as_secs_f64().ceil() as u64;
        let retry_minutes = (retry_after.as_secs_f64() / 60.0).ceil().max(1.0) as u64;
        warn!(identifier = %identifier, retry_after_secs = retry_secs, "rate limit exceeded");

        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_secs.to_string())],
            Json(ErrorBody {
                error: "Too Many Requests".to_string(),
                code: ErrorCode::RateLimitError,
                message: format!(
                    "Rate limit exceeded. Please try again in {retry_minutes} minute(s)."
                ),
            }),
        )
            .into_response();
    }
    ctx.limiter.record_request(&identifier).await;

    request.extensions_mut().insert(ClientId(identifier));
    next.run(request).await
}

/// Rate-limit key: first X-Forwarded-For hop when present, else the peer
/// address.
fn client_identifier(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn analyze_handler(
    State(ctx): State<AppContext>,
    identifier: Option<Extension<ClientId>>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let identifier = identifier
        .map(|Extension(ClientId(id))| id)
        .unwrap_or_else(|| "unknown".to_string());

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Validation Error",
                ErrorCode::ValidationError,
                "Request body must be a JSON object with a string \"scenario\" field",
            );
        }
    };

    match ctx.engine.analyze(&request.scenario, &identifier).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_from(err, &identifier),
    }
}

/// Maps pipeline errors to the HTTP error envelope. Internal detail (contract
/// error lists, provider messages) stays in the logs.
fn error_from(err: FrameAuditError, identifier: &str) -> Response {
    match err {
        FrameAuditError::Validation { message } => error_response(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            ErrorCode::ValidationError,
            &message,
        ),
        FrameAuditError::Provider { .. } | FrameAuditError::Parse { .. } => {
            error!(identifier, error = %err, "generation failed after retry");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                ErrorCode::ProcessingError,
                "Analysis service temporarily unavailable. Please try again.",
            )
        }
        FrameAuditError::Contract { .. } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Processing Error",
            ErrorCode::ProcessingError,
            "Analysis could not be completed. Please try again.",
        ),
        FrameAuditError::Config { .. } | FrameAuditError::Internal { .. } => {
            error!(identifier, error = %err, "unexpected failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                ErrorCode::ProcessingError,
                "An unexpected error occurred. Please try again.",
            )
        }
    }
}

fn error_response(
    status: StatusCode,
    error: &str,
    code: ErrorCode,
    message: &str,
) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            code,
            message: message.to_string(),
        }),
    )
        .into_response()
}
