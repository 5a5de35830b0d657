//! `hostrelay validate` — resolve the configuration without starting.
//!
//! Runs the exact resolution `run` performs (file, env, flags) and
//! reports the result as human-readable text or JSON.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::{self, validation};
use crate::error::RelayError;

pub fn execute(args: &ValidateArgs) -> Result<(), RelayError> {
    let config = match config::load(&args.proxy) {
        Ok(config) => config,
        Err(RelayError::ConfigValidation { errors }) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} configuration has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    let json_errors: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "field": e.field,
                                "message": e.message,
                                "suggestion": e.suggestion,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "errors": json_errors,
                        })
                    );
                }
            }
            return Err(RelayError::ConfigValidation { errors });
        }
        Err(other) => return Err(other),
    };

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", validation::format_validation_report(&config));
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "listen": config.listen_address,
                    "target": config.target.to_string(),
                    "host": config.host_override_str(),
                    "cors": config.cors_policy.to_string(),
                    "timeout_secs": config.upstream_timeout.as_secs(),
                    "forwarded_headers": config.forwarded_headers,
                })
            );
        }
    }

    Ok(())
}
