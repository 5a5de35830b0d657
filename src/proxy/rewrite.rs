//! Request side of the rewrite pipeline.
//!
//! [`rewrite_request`] turns an inbound request into the outbound one:
//! the target's scheme and authority replace the inbound ones, the
//! target's path is prefixed onto the inbound path, queries are merged,
//! and the Host header is replaced only when an override is configured.
//! Everything here is synchronous and allocation-light; the body is moved
//! through untouched.

use http::header::HOST;
use http::uri::{PathAndQuery, Uri};
use http::Request;

use crate::config::{ProxyConfig, Target};
use crate::error::RelayError;

use super::headers;

/// Join two path segments with exactly one slash between them.
#[must_use]
pub fn join_path(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Target query first, inbound query second.
#[must_use]
pub fn join_query(target: Option<&str>, inbound: Option<&str>) -> Option<String> {
    match (target.filter(|q| !q.is_empty()), inbound.filter(|q| !q.is_empty())) {
        (Some(t), Some(i)) => Some(format!("{t}&{i}")),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    }
}

/// Build the absolute upstream URI for an inbound request URI.
pub fn outbound_uri(target: &Target, inbound: &Uri) -> Result<Uri, RelayError> {
    let path = join_path(target.path(), inbound.path());
    let path_and_query = match join_query(target.query(), inbound.query()) {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let path_and_query = PathAndQuery::try_from(path_and_query.as_str())
        .map_err(|e| RelayError::InvalidUri { source: e.into() })?;

    Uri::builder()
        .scheme(target.scheme().clone())
        .authority(target.authority().clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(|source| RelayError::InvalidUri { source })
}

/// Produce the outbound request. The inbound header set is kept minus
/// hop-by-hop headers (an upgrade request keeps its `Connection`/`Upgrade`
/// pair); Host is replaced only by an explicit override.
pub fn rewrite_request<B>(
    config: &ProxyConfig,
    request: Request<B>,
) -> Result<Request<B>, RelayError> {
    let (mut parts, body) = request.into_parts();

    parts.uri = outbound_uri(&config.target, &parts.uri)?;
    let upgrade = headers::upgrade_protocol(&parts.headers);
    headers::strip_hop_by_hop(&mut parts.headers);
    if let Some(protocol) = upgrade {
        headers::restore_upgrade(&mut parts.headers, protocol);
    }
    if let Some(ref host) = config.host_override {
        parts.headers.insert(HOST, host.clone());
    }

    Ok(Request::from_parts(parts, body))
}
