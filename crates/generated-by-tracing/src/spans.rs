//! Span builder helpers for generated-by instrumentation.

/// Create a tracing span covering one request through the generated-by
/// middleware.
///
/// Usage: `let span = request_span!(request.method(), request.uri().path());`
///
/// Fields recorded later by the middleware:
/// - `server_id`: the fingerprint written to `X-Generated-By` (empty when none)
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::debug_span!(
            "generated_by",
            method = %$method,
            path = %$path,
            server_id = tracing::field::Empty,
        )
    };
}
