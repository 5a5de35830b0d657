//! Configuration validation with detailed error reporting.
//!
//! [`resolve`] checks a merged [`RawConfig`] and either produces the
//! immutable [`ProxyConfig`] or returns every problem it found as a list
//! of [`ValidationError`] values with suggestions.

use std::time::Duration;

use http::HeaderValue;

use super::model::RawConfig;
use super::{CorsPolicy, ProxyConfig, Target, DEFAULT_LISTEN, DEFAULT_TIMEOUT_SECS};
use crate::error::ValidationError;

/// Normalize a listen address. A bare `:port` binds every IPv4 interface.
pub fn validate_listen(listen: &str) -> Result<String, String> {
    let normalized = if listen.starts_with(':') {
        format!("0.0.0.0{listen}")
    } else {
        listen.to_string()
    };

    let Some((host, port)) = normalized.rsplit_once(':') else {
        return Err(format!("'{listen}' is missing a port"));
    };
    if host.is_empty() {
        return Err(format!("'{listen}' is missing a host"));
    }
    if port.parse::<u16>().is_err() {
        return Err(format!("'{port}' is not a valid port"));
    }
    Ok(normalized)
}

/// Unify the boolean and string CORS selectors into one [`CorsPolicy`].
pub fn resolve_cors(allow_all: bool, origin: Option<&str>) -> Result<CorsPolicy, String> {
    match (allow_all, origin.map(str::trim)) {
        (true, Some(origin)) if !origin.is_empty() => {
            Err("cors and cors_origin cannot both be set".into())
        }
        (true, _) => Ok(CorsPolicy::AllowAll),
        (false, None | Some("")) => Ok(CorsPolicy::Disabled),
        (false, Some("*")) => Ok(CorsPolicy::AllowAll),
        (false, Some(origin)) => HeaderValue::from_str(origin)
            .map(CorsPolicy::AllowOrigin)
            .map_err(|_| format!("'{origin}' is not a valid header value")),
    }
}

/// An empty override means "keep the client's Host".
pub fn resolve_host_override(host: Option<&str>) -> Result<Option<HeaderValue>, String> {
    match host {
        None | Some("") => Ok(None),
        Some(host) => HeaderValue::from_str(host)
            .map(Some)
            .map_err(|_| format!("'{host}' is not a valid header value")),
    }
}

pub fn resolve(raw: &RawConfig) -> Result<ProxyConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listen = validate_listen(raw.listen.as_deref().unwrap_or(DEFAULT_LISTEN))
        .map_err(|msg| {
            errors.push(
                ValidationError::new("listen", msg).with_suggestion("use host:port or :port"),
            );
        })
        .ok();

    let target = match raw.target.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(
                ValidationError::new("target", "a target URL is required")
                    .with_suggestion("pass --target http://host:port"),
            );
            None
        }
        Some(url) => Target::parse(url)
            .map_err(|msg| {
                let err = ValidationError::new("target", msg);
                let err = if url.contains("://") {
                    err
                } else {
                    err.with_suggestion(format!("did you mean 'http://{url}'?"))
                };
                errors.push(err);
            })
            .ok(),
    };

    let host_override = resolve_host_override(raw.host.as_deref())
        .map_err(|msg| errors.push(ValidationError::new("host", msg)))
        .ok()
        .flatten();

    let cors_policy = resolve_cors(raw.cors, raw.cors_origin.as_deref())
        .map_err(|msg| errors.push(ValidationError::new("cors", msg)))
        .ok();

    let timeout_secs = raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        errors.push(ValidationError::new(
            "timeout",
            "upstream timeout must be at least 1 second",
        ));
    }

    match (listen, target, cors_policy) {
        (Some(listen_address), Some(target), Some(cors_policy)) if errors.is_empty() => {
            Ok(ProxyConfig {
                listen_address,
                target,
                host_override,
                cors_policy,
                upstream_timeout: Duration::from_secs(timeout_secs),
                forwarded_headers: raw.forwarded_headers,
            })
        }
        _ => Err(errors),
    }
}

#[must_use]
pub fn format_validation_report(config: &ProxyConfig) -> String {
    let host = config
        .host_override_str()
        .map_or_else(|| "(client Host preserved)".to_string(), String::from);
    let lines = [
        format!("  listen:  {}", config.listen_address),
        format!("  target:  {}", config.target),
        format!("  host:    {host}"),
        format!("  cors:    {}", config.cors_policy),
        format!("  timeout: {}s", config.upstream_timeout.as_secs()),
    ];
    format!("configuration is valid\n{}", lines.join("\n"))
}
