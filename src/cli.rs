//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate), and their associated argument structs.
//! Every proxy flag has an environment variable equivalent for container
//! deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "hostrelay",
    version,
    about = "Single-hop HTTP forwarding proxy with Host rewriting and CORS injection",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        hostrelay run --target http://localhost:3000            Forward :8080 to a local app\n  \
        hostrelay run --target http://api:9000 --host api.dev   Rewrite the Host header\n  \
        hostrelay run --target http://localhost:3000 --cors     Allow all cross-origin requests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Resolve and check the configuration without starting
    Validate(ValidateArgs),
}

/// Proxy settings shared by `run` and `validate`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProxyArgs {
    /// Listen address (`host:port`, or `:port` for all interfaces)
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Target URL to forward to
    #[arg(short, long, env = "TARGET")]
    pub target: Option<String>,

    /// Host header value sent upstream (defaults to the client's Host)
    #[arg(long, env = "HOST_OVERRIDE")]
    pub host: Option<String>,

    /// Allow all cross-origin requests
    #[arg(long, env = "CORS_ALLOW_ALL", help_heading = "CORS")]
    pub cors: bool,

    /// Allowed cross-origin origin, or `*` for any
    #[arg(
        long,
        env = "CORS_ORIGIN",
        conflicts_with = "cors",
        help_heading = "CORS"
    )]
    pub cors_origin: Option<String>,

    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seconds allowed for each upstream exchange, bodies included
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", help_heading = "Tuning")]
    pub timeout: Option<u64>,

    /// Add X-Forwarded-For, X-Forwarded-Host and X-Forwarded-Proto upstream
    #[arg(long, env = "FORWARDED_HEADERS", help_heading = "Tuning")]
    pub forwarded_headers: bool,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        hostrelay run -t http://localhost:3000                       Forward :8080\n  \
        hostrelay run -t http://localhost:3000 --listen 127.0.0.1:9090  Custom listener\n  \
        hostrelay run -c relay.yaml --pretty                          File config, local dev")]
pub struct RunArgs {
    #[command(flatten)]
    pub proxy: ProxyArgs,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub proxy: ProxyArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn run_accepts_original_flag_names() {
        let args = run_args(&[
            "hostrelay",
            "run",
            "--listen",
            ":9000",
            "--target",
            "http://localhost:3000",
            "--host",
            "api.example.com",
            "--cors",
        ]);
        assert_eq!(args.proxy.listen.as_deref(), Some(":9000"));
        assert_eq!(args.proxy.target.as_deref(), Some("http://localhost:3000"));
        assert_eq!(args.proxy.host.as_deref(), Some("api.example.com"));
        assert!(args.proxy.cors);
        assert!(args.proxy.cors_origin.is_none());
    }

    #[test]
    fn cors_and_cors_origin_conflict() {
        let result = Cli::try_parse_from([
            "hostrelay",
            "run",
            "--target",
            "http://localhost:3000",
            "--cors",
            "--cors-origin",
            "https://app.example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pretty_and_json_conflict() {
        let result = Cli::try_parse_from([
            "hostrelay",
            "run",
            "--target",
            "http://localhost:3000",
            "--pretty",
            "--json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn validate_defaults_to_text_output() {
        let cli = Cli::try_parse_from(["hostrelay", "validate", "-t", "http://a:1"]).unwrap();
        let Some(Commands::Validate(args)) = cli.command else {
            panic!("expected validate subcommand");
        };
        assert!(matches!(args.format, ValidateFormat::Text));
        assert_eq!(args.proxy.target.as_deref(), Some("http://a:1"));
    }

    #[test]
    fn log_level_maps_to_tracing() {
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
    }
}
