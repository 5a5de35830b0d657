//! The rewrite pipeline and the HTTP handler that drives it.
//!
//! [`forward_handler`] is the Axum fallback that receives every request.
//! For each one it runs the request rewriter ([`rewrite`]), sends the
//! outbound request through the shared client, and runs the response
//! rewriter ([`cors`]) on that same request's upstream response. Header
//! helpers live in [`headers`]. Bodies are streamed in both directions
//! under one deadline ([`deadline`]); a `101` hands both connections to
//! [`upgrade`].

pub mod cors;
pub mod deadline;
pub mod headers;
pub mod rewrite;
pub mod upgrade;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::error::RelayError;
use crate::server::AppState;

use self::deadline::DeadlineBody;

/// Axum fallback for every inbound request: forwards it upstream and
/// logs the outcome. Upstream failures become `502`/`504` for this
/// request only.
pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match forward(&state, addr, &request_id, request).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "request forwarded"
            );
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e,
                latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "upstream request failed"
            );
            e.status_code().into_response()
        }
    }
}

/// One pipeline invocation: rewrite, send, rewrite the matching response.
///
/// Dropping this future (client gone) cancels the upstream request and
/// releases both bodies. Past the deadline, waiting for the response head
/// fails with a timeout and either body still streaming fails the same way.
async fn forward(
    state: &AppState,
    client_addr: SocketAddr,
    request_id: &str,
    mut request: Request,
) -> Result<Response, RelayError> {
    let config = &state.config;
    let budget = config.upstream_timeout;
    let deadline = tokio::time::Instant::now() + budget;

    if config.forwarded_headers {
        headers::add_forwarded(request.headers_mut(), client_addr.ip());
    } else {
        headers::strip_forwarded(request.headers_mut());
    }

    let client_upgrade = headers::upgrade_protocol(request.headers())
        .is_some()
        .then(|| hyper::upgrade::on(&mut request));

    let method = request.method().clone();
    let request = request.map(|body| DeadlineBody::wrap(body, deadline, budget));
    let outbound = rewrite::rewrite_request(config, request)?;
    tracing::debug!(method = %method, uri = %outbound.uri(), "forwarding upstream");

    let upstream = state.http_client.request(outbound);
    let mut upstream = tokio::time::timeout_at(deadline, upstream)
        .await
        .map_err(|_| RelayError::UpstreamTimeout { after: budget })?
        .map_err(|e| RelayError::Upstream {
            source: Box::new(e),
        })?;

    let upstream_upgrade = (upstream.status() == StatusCode::SWITCHING_PROTOCOLS)
        .then(|| hyper::upgrade::on(&mut upstream));
    let upgrade_protocol = headers::upgrade_protocol(upstream.headers());

    let mut response =
        cors::rewrite_response(&config.cors_policy, &method, upstream.map(Body::new));
    headers::strip_hop_by_hop(response.headers_mut());

    match (client_upgrade, upstream_upgrade, upgrade_protocol) {
        (Some(client), Some(upstream), Some(protocol))
            if response.status() == StatusCode::SWITCHING_PROTOCOLS =>
        {
            headers::restore_upgrade(response.headers_mut(), protocol);
            upgrade::tunnel(client, upstream, request_id.to_string());
            Ok(response)
        }
        _ => Ok(response.map(|body| DeadlineBody::wrap(body, deadline, budget))),
    }
}
