//! Config file loading.
//!
//! The file format is chosen by extension: YAML (`yaml` feature, on by
//! default), JSON (`json`), or TOML (`toml`). A file only supplies
//! defaults; command-line flags and environment variables win.

use std::path::Path;

use super::model::RawConfig;
use crate::error::RelayError;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<RawConfig, RelayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(RelayError::UnsupportedFormat(other.to_string())),
    }
}

/// Read and parse a config file. Runs once at startup, before the listener binds.
pub fn load_file(path: &Path) -> Result<RawConfig, RelayError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelayError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RelayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let raw = parse_config_str(ext, &content, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "yaml")]
    #[test]
    fn parses_yaml() {
        let raw = parse_config_str(
            "yaml",
            "target: http://localhost:3000\nhost: api.example.com\ncors: true\n",
            "relay.yaml",
        )
        .unwrap();
        assert_eq!(raw.target.as_deref(), Some("http://localhost:3000"));
        assert_eq!(raw.host.as_deref(), Some("api.example.com"));
        assert!(raw.cors);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn unknown_keys_are_rejected() {
        let result = parse_config_str("yml", "target: http://a:1\nretries: 3\n", "relay.yml");
        assert!(matches!(result, Err(RelayError::ConfigParse { .. })));
    }

    #[cfg(feature = "json")]
    #[test]
    fn parses_json() {
        let raw = parse_config_str(
            "json",
            r#"{"target": "http://localhost:3000", "cors_origin": "*"}"#,
            "relay.json",
        )
        .unwrap();
        assert_eq!(raw.cors_origin.as_deref(), Some("*"));
    }

    #[test]
    fn unsupported_extension_fails() {
        let result = parse_config_str("xml", "<relay/>", "relay.xml");
        assert!(matches!(result, Err(RelayError::UnsupportedFormat(ext)) if ext == "xml"));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_file(Path::new("definitely/not/here.yaml"));
        assert!(matches!(result, Err(RelayError::ConfigFileNotFound { .. })));
    }
}
