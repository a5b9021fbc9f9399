//! `X-Generated-By` response header.
//!
//! [`GeneratedBy`] is constructed explicitly and handed to the router as
//! middleware state; it has no dependencies and no shared mutable state.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::Router;
use http::{HeaderName, HeaderValue};
use tracing::Instrument;

use crate::error::FingerprintError;
use crate::fingerprint::{self, ServerId};
use crate::params::{collect_server_params, ParamsSource, ServerParams};

/// Response header carrying the server fingerprint.
pub const GENERATED_BY_HEADER: HeaderName = HeaderName::from_static("x-generated-by");

/// Stateless fingerprinting service.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedBy;

impl GeneratedBy {
    pub fn new() -> Self {
        Self
    }

    pub fn server_id(&self, params: &ServerParams) -> Result<Option<ServerId>, FingerprintError> {
        fingerprint::server_id(params)
    }

    /// Header value for `params`; empty when there is no fingerprint.
    pub fn header_value(&self, params: &ServerParams) -> HeaderValue {
        HeaderValue::try_from(fingerprint::fingerprint(params))
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// Middleware that sets `X-Generated-By` on every response.
///
/// Reads the [`ServerParams`] left in the request extensions by
/// [`collect_server_params`]; without them the header is set to `""`.
/// Any value written by the handler is replaced.
pub async fn generated_by(
    State(generator): State<GeneratedBy>,
    request: Request,
    next: Next,
) -> Response {
    let params = request
        .extensions()
        .get::<ServerParams>()
        .cloned()
        .unwrap_or_default();

    let span = generated_by_tracing::request_span!(request.method(), request.uri().path());

    let mut response = next.run(request).instrument(span.clone()).await;

    let value = generator.header_value(&params);
    span.record("server_id", value.to_str().unwrap_or_default());
    response.headers_mut().insert(GENERATED_BY_HEADER, value);
    response
}

/// Wrap `router` so every response carries `X-Generated-By`.
///
/// Server params are collected first (outer layer), then the header is set
/// on the way out.
pub fn apply(router: Router, generator: GeneratedBy, source: ParamsSource) -> Router {
    router
        .layer(from_fn_with_state(generator, generated_by))
        .layer(from_fn_with_state(Arc::new(source), collect_server_params))
}
