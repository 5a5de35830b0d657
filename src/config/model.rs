//! Serde shape of the settings accepted from a config file or the CLI.
//!
//! [`RawConfig`] is unvalidated: every field is optional so that a file
//! and the command line can each supply a subset. [`RawConfig::overlay`]
//! merges the two before [`validation::resolve`](super::validation::resolve)
//! turns the result into a [`ProxyConfig`](super::ProxyConfig).

use serde::{Deserialize, Serialize};

use crate::cli::ProxyArgs;

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub cors: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub forwarded_headers: bool,
}

impl RawConfig {
    /// Layer `self` (higher precedence) over `base`.
    ///
    /// The two CORS selectors travel together: if `self` sets either one,
    /// both of `base`'s are ignored.
    #[must_use]
    pub fn overlay(self, base: Self) -> Self {
        let (cors, cors_origin) = if self.cors || self.cors_origin.is_some() {
            (self.cors, self.cors_origin)
        } else {
            (base.cors, base.cors_origin)
        };

        Self {
            listen: self.listen.or(base.listen),
            target: self.target.or(base.target),
            host: self.host.or(base.host),
            cors,
            cors_origin,
            timeout_secs: self.timeout_secs.or(base.timeout_secs),
            forwarded_headers: self.forwarded_headers || base.forwarded_headers,
        }
    }
}

impl From<&ProxyArgs> for RawConfig {
    fn from(args: &ProxyArgs) -> Self {
        Self {
            listen: args.listen.clone(),
            target: args.target.clone(),
            host: args.host.clone(),
            cors: args.cors,
            cors_origin: args.cors_origin.clone(),
            timeout_secs: args.timeout,
            forwarded_headers: args.forwarded_headers,
        }
    }
}
