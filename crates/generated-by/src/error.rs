//! Error types for server fingerprinting.

/// Failure while turning server params into a fingerprint.
///
/// This is the only failure class of the fingerprint pipeline. It never
/// reaches HTTP clients: the middleware collapses it to an empty header.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// A server param carried raw bytes that are not valid UTF-8.
    #[error("server param {key} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        key: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },
}
