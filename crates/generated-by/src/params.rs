//! Server params: the transport-level metadata of a request.
//!
//! Populated once per request by [`collect_server_params`] from the accepted
//! connection, the `Host` header and operator overrides, then stored in the
//! request extensions for downstream middleware.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::connect_info::Connected;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum::serve::IncomingStream;
use http::header::HOST;
use http::uri::Authority;
use tokio::net::TcpListener;

pub const SERVER_ADDR: &str = "SERVER_ADDR";
pub const SERVER_NAME: &str = "SERVER_NAME";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";
pub const REMOTE_PORT: &str = "REMOTE_PORT";
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const REQUEST_URI: &str = "REQUEST_URI";

/// A scalar server param value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl ParamValue {
    /// String form of the value.
    ///
    /// Numbers render in decimal, `true` as `"1"` and `false` as `""`.
    /// Raw bytes must be UTF-8.
    pub fn as_text(&self) -> Result<Cow<'_, str>, std::str::Utf8Error> {
        Ok(match self {
            ParamValue::Text(s) => Cow::Borrowed(s.as_str()),
            ParamValue::Int(n) => Cow::Owned(n.to_string()),
            ParamValue::UInt(n) => Cow::Owned(n.to_string()),
            ParamValue::Float(n) => Cow::Owned(n.to_string()),
            ParamValue::Bool(true) => Cow::Borrowed("1"),
            ParamValue::Bool(false) => Cow::Borrowed(""),
            ParamValue::Bytes(b) => Cow::Borrowed(std::str::from_utf8(b)?),
        })
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::UInt(v)
    }
}

impl From<u16> for ParamValue {
    fn from(v: u16) -> Self {
        ParamValue::UInt(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<IpAddr> for ParamValue {
    fn from(v: IpAddr) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Bytes(v)
    }
}

/// Read-only view of a request's server params, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerParams {
    inner: BTreeMap<String, ParamValue>,
}

impl ServerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build the params for one request.
    ///
    /// Address keys come from the connection info when the server was started
    /// with [`ConnectionAddrs`]; overrides in `source` take precedence.
    /// `SERVER_NAME` falls back to the request authority without its port.
    pub fn from_request<B>(source: &ParamsSource, request: &http::Request<B>) -> Self {
        let mut params = Self::new();

        let conn = request
            .extensions()
            .get::<ConnectInfo<ConnectionAddrs>>()
            .map(|ConnectInfo(addrs)| addrs);

        if let Some(addrs) = conn {
            if let Some(local) = addrs.local {
                params.insert(SERVER_ADDR, local.ip());
                params.insert(SERVER_PORT, local.port());
            }
            params.insert(REMOTE_ADDR, addrs.remote.ip());
            params.insert(REMOTE_PORT, addrs.remote.port());
        }
        if let Some(addr) = &source.server_addr {
            params.insert(SERVER_ADDR, addr.as_str());
        }

        match &source.server_name {
            Some(name) => params.insert(SERVER_NAME, name.as_str()),
            None => {
                if let Some(host) = request_host(request) {
                    params.insert(SERVER_NAME, host);
                }
            }
        }

        params.insert(REQUEST_METHOD, request.method().as_str());
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        params.insert(REQUEST_URI, uri);

        params
    }
}

impl<K, V> FromIterator<(K, V)> for ServerParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Host name of the request: `Host` header, else the URI authority
/// (HTTP/2), with any port stripped.
fn request_host<B>(request: &http::Request<B>) -> Option<String> {
    let from_header = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Authority>().ok())
        .map(|a| a.host().to_string());

    from_header.or_else(|| request.uri().host().map(str::to_string))
}

/// Local and peer addresses of an accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionAddrs {
    /// Address the server accepted the connection on.
    pub local: Option<SocketAddr>,
    pub remote: SocketAddr,
}

impl Connected<IncomingStream<'_, TcpListener>> for ConnectionAddrs {
    fn connect_info(stream: IncomingStream<'_, TcpListener>) -> Self {
        Self {
            local: stream.io().local_addr().ok(),
            remote: *stream.remote_addr(),
        }
    }
}

/// Operator overrides for the identity params.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsSource {
    /// Advertised address, replacing the socket's local IP
    /// (useful when bound to `0.0.0.0`).
    pub server_addr: Option<String>,
    /// Virtual host name, replacing the request's `Host`.
    pub server_name: Option<String>,
}

/// Middleware storing [`ServerParams`] in the request extensions.
///
/// Params already present (inserted by an outer layer) are left untouched.
pub async fn collect_server_params(
    State(source): State<Arc<ParamsSource>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<ServerParams>().is_none() {
        let params = ServerParams::from_request(&source, &request);
        tracing::trace!(count = params.len(), "Collected server params");
        request.extensions_mut().insert(params);
    }
    next.run(request).await
}
