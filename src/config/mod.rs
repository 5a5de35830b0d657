//! Startup configuration: resolution, validation, and the resolved model.
//!
//! [`ProxyConfig`] is built once by [`load`] and never mutated afterwards;
//! the server shares it read-only between every in-flight request.
//! Submodules provide the raw serde model ([`model`]), config file parsing
//! ([`sources`]), and validation ([`validation`]).

pub mod model;
pub mod sources;
pub mod validation;

use std::time::Duration;

use http::uri::{Authority, Scheme};
use http::HeaderValue;
use url::Url;

use crate::cli::ProxyArgs;
use crate::error::RelayError;
use model::RawConfig;

pub const DEFAULT_LISTEN: &str = ":8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 150;

/// Which cross-origin headers, if any, are injected into responses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsPolicy {
    #[default]
    Disabled,
    AllowAll,
    AllowOrigin(HeaderValue),
}

impl CorsPolicy {
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Value sent as `Access-Control-Allow-Origin`, if the policy is active.
    #[must_use]
    pub fn allow_origin(&self) -> Option<HeaderValue> {
        match self {
            Self::Disabled => None,
            Self::AllowAll => Some(HeaderValue::from_static("*")),
            Self::AllowOrigin(origin) => Some(origin.clone()),
        }
    }
}

impl std::fmt::Display for CorsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::AllowAll => f.write_str("allow all"),
            Self::AllowOrigin(origin) => {
                write!(f, "allow {}", String::from_utf8_lossy(origin.as_bytes()))
            }
        }
    }
}

/// The upstream every request is forwarded to.
///
/// Holds the parsed URL together with the pre-validated URI pieces the
/// request rewriter needs, so rewriting never re-parses the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    scheme: Scheme,
    authority: Authority,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw).map_err(|e| format!("'{raw}' is not a valid URL ({e})"))?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => {
                return Err(format!(
                    "unsupported scheme '{other}' (expected http or https)"
                ))
            }
        };

        let Some(host) = url.host_str() else {
            return Err(format!("'{raw}' has no host"));
        };
        let authority = url
            .port()
            .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
        let authority = authority
            .parse::<Authority>()
            .map_err(|e| format!("'{raw}' has an invalid host ({e})"))?;

        Ok(Self {
            url,
            scheme,
            authority,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    #[must_use]
    pub const fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Base path every inbound path is appended to.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address handed to the listener, already normalized to `host:port`.
    pub listen_address: String,
    pub target: Target,
    pub host_override: Option<HeaderValue>,
    pub cors_policy: CorsPolicy,
    pub upstream_timeout: Duration,
    pub forwarded_headers: bool,
}

impl ProxyConfig {
    /// Minimal config forwarding to `target` with every knob at its default.
    pub fn for_target(target: &str) -> Result<Self, RelayError> {
        let raw = RawConfig {
            target: Some(target.to_string()),
            ..RawConfig::default()
        };
        validation::resolve(&raw).map_err(|errors| RelayError::ConfigValidation { errors })
    }

    #[must_use]
    pub fn host_override_str(&self) -> Option<&str> {
        self.host_override.as_ref().and_then(|h| h.to_str().ok())
    }
}

/// Resolve the final configuration from CLI arguments and an optional file.
pub fn load(args: &ProxyArgs) -> Result<ProxyConfig, RelayError> {
    let cli = RawConfig::from(args);
    let raw = match args.config.as_deref() {
        Some(path) => cli.overlay(sources::load_file(path)?),
        None => cli,
    };

    validation::resolve(&raw).map_err(|errors| RelayError::ConfigValidation { errors })
}
