use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::routes::ErrorResponse;
use crate::api::state::ApiState;
use crate::global::config::RelayConfig;
use crate::global::error::RelayError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// Passthrough relay: issue one outbound GET to the target and stream the
/// upstream status and body back, rewriting only Content-Type and
/// Cache-Control.
/// GET /api/proxy?url=<absolute-URL>
pub async fn relay(
    State(state): State<ApiState>,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let request_id = Uuid::new_v4();

    let target = validate_target(params.url.as_deref(), &state.config.relay)
        .map_err(|e| rejection(request_id, e))?;

    // The original's browser UA is forwarded so image CDNs answer the
    // relay the way they would answer the user.
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    info!(%request_id, url = %target, "relaying upstream fetch");

    let upstream = state
        .http
        .get(target)
        .header(header::USER_AGENT, user_agent)
        .header(header::ACCEPT_ENCODING, "identity")
        .send()
        .await
        .map_err(|e| rejection(request_id, RelayError::Upstream(e)))?;

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let cache_control = format!("public, max-age={}", state.config.relay.cache_max_age);

    Ok((
        status,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, cache_control),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

fn validate_target(raw: Option<&str>, relay: &RelayConfig) -> Result<reqwest::Url, RelayError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(RelayError::MissingUrl)?;

    let url = reqwest::Url::parse(raw).map_err(|_| RelayError::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelayError::SchemeNotAllowed);
    }

    let host = url.host_str().ok_or(RelayError::InvalidUrl)?;
    if !relay.is_host_allowed(host) {
        return Err(RelayError::HostNotAllowed(host.to_string()));
    }

    Ok(url)
}

fn rejection(request_id: Uuid, err: RelayError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        RelayError::MissingUrl | RelayError::InvalidUrl | RelayError::SchemeNotAllowed => {
            StatusCode::BAD_REQUEST
        }
        RelayError::HostNotAllowed(_) => StatusCode::FORBIDDEN,
        RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };

    if status == StatusCode::BAD_GATEWAY {
        error!(%request_id, error = %err, "relay upstream fetch failed");
    } else {
        warn!(%request_id, error = %err, "relay request rejected");
    }

    (status, Json(ErrorResponse { error: err.to_string() }))
}
