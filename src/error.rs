//! Unified error types for hostrelay.
//!
//! Defines [`RelayError`] (the main crate error enum) and
//! [`ValidationError`] for configuration problems. Only two classes of
//! failure exist at runtime: a fatal configuration error raised before
//! the listener binds, and a per-request upstream error that is turned
//! into a `5xx` response for that request alone.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Invalid configuration:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid outbound URI: {source}")]
    InvalidUri {
        #[source]
        source: http::Error,
    },

    #[error("Upstream request failed: {source}")]
    Upstream {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Upstream did not respond within {}s", .after.as_secs())]
    UpstreamTimeout { after: Duration },
}

impl RelayError {
    /// Status code returned to the client when this error ends a request.
    #[must_use]
    pub const fn status_code(&self) -> http::StatusCode {
        match self {
            Self::UpstreamTimeout { .. } => http::StatusCode::GATEWAY_TIMEOUT,
            _ => http::StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_listed_one_per_line() {
        let err = RelayError::ConfigValidation {
            errors: vec![
                ValidationError::new("target", "is required"),
                ValidationError::new("listen", "'nope' is not a valid address")
                    .with_suggestion("use host:port or :port"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration:\n  target: is required\n  listen: 'nope' is not a valid address (use host:port or :port)"
        );
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = RelayError::UpstreamTimeout {
            after: Duration::from_secs(150),
        };
        assert_eq!(err.status_code(), http::StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.to_string(), "Upstream did not respond within 150s");
    }

    #[test]
    fn transport_failure_maps_to_bad_gateway() {
        let err = RelayError::Upstream {
            source: "connection refused".into(),
        };
        assert_eq!(err.status_code(), http::StatusCode::BAD_GATEWAY);
    }
}
