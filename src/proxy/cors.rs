//! Response side of the rewrite pipeline: CORS injection and the
//! `OPTIONS` preflight short-circuit.
//!
//! With [`CorsPolicy::Disabled`] the upstream response is returned as is.
//! Otherwise the four `Access-Control-*` headers are set (replacing any
//! upstream values), and a response to an `OPTIONS` request is replaced by
//! an empty `204 No Content` after the upstream body has been dropped.

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE,
    TRANSFER_ENCODING, X_CONTENT_TYPE_OPTIONS,
};
use http::{HeaderValue, Method, Response, StatusCode};

use crate::config::CorsPolicy;

pub const ALLOW_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization, accept, origin, Cache-Control, X-Requested-With";
pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS, PUT, HEAD, DELETE";
pub const PREFLIGHT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Apply `policy` to the upstream response of a request made with `request_method`.
///
/// `request_method` must be the method of the request that produced
/// `response`; it decides whether the preflight short-circuit applies.
pub fn rewrite_response<B: Default>(
    policy: &CorsPolicy,
    request_method: &Method,
    response: Response<B>,
) -> Response<B> {
    let Some(allow_origin) = policy.allow_origin() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let headers = &mut parts.headers;
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );

    if request_method != Method::OPTIONS {
        return Response::from_parts(parts, body);
    }

    // Dropping the upstream body releases its connection whether or not it was read.
    drop(body);

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PREFLIGHT_CONTENT_TYPE));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
    parts.status = StatusCode::NO_CONTENT;

    Response::from_parts(parts, B::default())
}
