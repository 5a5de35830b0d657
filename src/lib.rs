//! hostrelay is a single-hop HTTP forwarding proxy.
//!
//! Every inbound request is retargeted to one upstream URL, optionally
//! with a rewritten `Host` header, and the upstream response is returned
//! to the client. When a CORS policy is active, cross-origin headers are
//! injected and `OPTIONS` preflights are answered with `204 No Content`.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate).
//! - [`config`] -- Startup configuration: CLI/env/file layering, validation,
//!   and the immutable [`ProxyConfig`](config::ProxyConfig).
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- The rewrite pipeline: request rewriting, CORS response
//!   rewriting, header helpers, and the forwarding handler.
//! - [`server`] -- Axum router, shared state, HTTP client, and graceful
//!   shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod server;
