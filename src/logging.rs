//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with either JSON output (for
//! production) or pretty-printed output (for TTY / local dev). Format
//! is auto-detected from the terminal but can be forced via `--json`
//! or `--pretty`. Client-pool and TLS crates stay at `warn` unless the
//! level is `trace`, so `debug` shows the proxy's own decisions only.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

const TRANSPORT_TARGETS: &[&str] = &["hyper", "hyper_util", "hyper_rustls", "rustls"];

#[must_use]
pub fn filter_for(level: &LogLevel) -> Targets {
    let tracing_level = level.to_tracing_level();
    let filter = Targets::new().with_default(tracing_level);
    if matches!(level, LogLevel::Trace) {
        return filter;
    }
    let transport_level = LevelFilter::from_level(tracing_level).min(LevelFilter::WARN);
    TRANSPORT_TARGETS
        .iter()
        .fold(filter, |f, target| f.with_target(*target, transport_level))
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let filter = filter_for(level);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
