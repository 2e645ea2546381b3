use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, DefaultBodyLimit, FromRequestParts, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::llm::{DynDocumenter, TextGenerator};
use super::models::{ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse, ProjectSummary};
use super::rate_limiter::{describe_duration, RateLimitDecision, RateLimitStore};

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";
const GENERATION_FAILED_MESSAGE: &str = "Failed to generate README";
const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Shared state behind every gateway request
#[derive(Clone)]
pub struct GatewayState {
    pub documenter: Arc<DynDocumenter>,
    pub rate_limiter: Arc<RateLimitStore>,
    pub service_name: String,
    pub trusted_proxy_hops: usize,
    pub body_limit_bytes: usize,
}

impl GatewayState {
    pub fn new(config: &Config, generator: Box<dyn TextGenerator>) -> Self {
        Self::with_rate_limiter(config, generator, RateLimitStore::new(&config.rate_limit))
    }

    pub fn with_rate_limiter(
        config: &Config,
        generator: Box<dyn TextGenerator>,
        rate_limiter: RateLimitStore,
    ) -> Self {
        Self {
            documenter: Arc::new(DynDocumenter::new(generator)),
            rate_limiter: Arc::new(rate_limiter),
            service_name: config.server.service_name.clone(),
            trusted_proxy_hops: config.server.trusted_proxy_hops,
            body_limit_bytes: config.server.body_limit_bytes,
        }
    }
}

pub fn create_router(state: GatewayState) -> Router {
    let body_limit = state.body_limit_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rate limit key for a request
///
/// Behind `trusted_proxy_hops` proxies the key is the `X-Forwarded-For` entry
/// the outermost trusted proxy appended, counted from the right. Entries to
/// its left are client-controlled and never used. Without a usable header the
/// socket peer address is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromRequestParts<GatewayState> for ClientIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        if state.trusted_proxy_hops > 0 {
            let forwarded = parts
                .headers
                .get(FORWARDED_FOR)
                .and_then(|h| h.to_str().ok())
                .and_then(|v| forwarded_client(v, state.trusted_proxy_hops));

            if let Some(address) = forwarded {
                return Ok(ClientIdentity(address));
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

        Ok(ClientIdentity(peer))
    }
}

/// With fewer entries than trusted hops the left-most entry is the client
fn forwarded_client(header: &str, hops: usize) -> Option<String> {
    let chain: Vec<&str> = header
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    chain
        .iter()
        .rev()
        .nth(hops.saturating_sub(1))
        .or_else(|| chain.first())
        .map(|entry| entry.to_string())
}

/// Every non-success outcome of the generate endpoint
#[derive(Debug)]
pub enum GatewayRejection {
    RateLimited { retry_after: Duration, window: Duration },
    Validation(&'static str),
    InvalidBody,
    Generation(String),
}

impl IntoResponse for GatewayRejection {
    fn into_response(self) -> Response {
        match self {
            GatewayRejection::RateLimited { retry_after, window } => {
                let body = ErrorResponse {
                    retry_after: Some(describe_duration(window)),
                    ..ErrorResponse::new(RATE_LIMITED_MESSAGE)
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(retry_after.as_secs().max(1)),
                );
                response
            }
            GatewayRejection::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            GatewayRejection::InvalidBody => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(INVALID_BODY_MESSAGE)))
                    .into_response()
            }
            GatewayRejection::Generation(message) => {
                let body = ErrorResponse {
                    message: Some(message),
                    ..ErrorResponse::new(GENERATION_FAILED_MESSAGE)
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.service_name.clone(),
    })
}

async fn generate(
    State(state): State<GatewayState>,
    client: ClientIdentity,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, GatewayRejection> {
    let started = Instant::now();
    let result = handle_generate(&state, &client, payload).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(response) => info!(
            client = %client,
            elapsed_ms,
            readme_chars = response.readme.len(),
            "README generated"
        ),
        Err(GatewayRejection::Generation(message)) => {
            error!(client = %client, elapsed_ms, error = %message, "README generation failed")
        }
        Err(rejection) => warn!(client = %client, elapsed_ms, ?rejection, "Request rejected"),
    }

    result.map(Json)
}

async fn handle_generate(
    state: &GatewayState,
    client: &ClientIdentity,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<GenerateResponse, GatewayRejection> {
    match state.rate_limiter.check(&client.0).await {
        RateLimitDecision::Allowed { remaining } => {
            debug!(client = %client, remaining, "Request admitted")
        }
        RateLimitDecision::Limited { retry_after } => {
            return Err(GatewayRejection::RateLimited {
                retry_after,
                window: state.rate_limiter.window(),
            });
        }
    }

    let Json(request) = payload.map_err(|rejection| {
        warn!(client = %client, error = %rejection.body_text(), "Unreadable request body");
        GatewayRejection::InvalidBody
    })?;

    let report = request
        .project_info
        .ok_or(GatewayRejection::Validation("projectInfo is required"))?;
    let sample_code = request
        .sample_code
        .filter(|s| !s.is_empty())
        .ok_or(GatewayRejection::Validation("sampleCode is required"))?;

    let project = if report.name.is_empty() { "unknown" } else { report.name.as_str() };
    info!(
        client = %client,
        project = %project,
        project_type = %report.project_type,
        "Generating README"
    );

    let readme = state
        .documenter
        .generate_readme(&report, &sample_code)
        .await
        .map_err(|e| GatewayRejection::Generation(e.to_string()))?;

    Ok(GenerateResponse {
        success: true,
        readme,
        project_info: ProjectSummary::from(&report),
    })
}
