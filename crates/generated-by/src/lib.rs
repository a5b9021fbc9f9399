//! generated-by: stamps HTTP responses with a stable fingerprint of the
//! server instance that produced them (`X-Generated-By`).
//!
//! The fingerprint is a version-5 UUID of the server's address and host name;
//! see [`fingerprint`]. [`middleware::apply`] wires it into an axum router.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod middleware;
pub mod params;
pub mod server;

pub use error::FingerprintError;
pub use fingerprint::{fingerprint, server_id, ServerId};
pub use middleware::{GeneratedBy, GENERATED_BY_HEADER};
pub use params::{ConnectionAddrs, ParamValue, ParamsSource, ServerParams};
