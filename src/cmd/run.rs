//! `hostrelay run` — start the proxy server.
//!
//! Resolves configuration (a failure here exits before any socket is
//! bound), binds the listener, and serves until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::{self, ProxyConfig};
use crate::error::RelayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = config::load(&args.proxy).inspect_err(|e| {
        tracing::error!(error = %e, "invalid configuration, not starting");
    })?;

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .inspect_err(|e| {
            tracing::error!(addr = %config.listen_address, error = %e, "failed to bind listener");
        })?;

    log_startup(&config, listener.local_addr()?);

    let router = server::build_router(Arc::new(AppState::new(config)));
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("hostrelay stopped");
    Ok(())
}

fn log_startup(config: &ProxyConfig, addr: SocketAddr) {
    tracing::info!(
        addr = %addr,
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("HOSTRELAY_GIT_SHORT"),
        "hostrelay listening"
    );
    tracing::info!(target_url = %config.target, "forwarding to target");
    if let Some(host) = config.host_override_str() {
        tracing::info!(host = %host, "rewriting Host header");
    }
    if config.cors_policy.is_enabled() {
        tracing::info!(cors = %config.cors_policy, "injecting cross-origin headers");
    }
    if config.forwarded_headers {
        tracing::info!("adding X-Forwarded-* headers");
    }
}
