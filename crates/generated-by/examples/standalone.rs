//! Run a single request through the `X-Generated-By` middleware and print
//! the resulting header.
//!
//! `cargo run -p generated-by --example standalone`

use axum::body::Body;
use axum::routing::get;
use axum::Router;
use generated_by::params::{SERVER_ADDR, SERVER_NAME};
use generated_by::{middleware, GeneratedBy, ParamsSource, ServerParams, GENERATED_BY_HEADER};
use tower::ServiceExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = middleware::apply(
        Router::new().route("/", get(|| async { "" })),
        GeneratedBy::new(),
        ParamsSource::default(),
    );

    let params: ServerParams = [(SERVER_ADDR, "1.1.1.1"), (SERVER_NAME, "www.example.com")]
        .into_iter()
        .collect();
    let mut request = http::Request::builder().uri("/").body(Body::empty())?;
    request.extensions_mut().insert(params);

    let response = app.oneshot(request).await?;
    let uuid = response
        .headers()
        .get(GENERATED_BY_HEADER)
        .map(|v| v.to_str())
        .transpose()?
        .unwrap_or_default();

    println!("{uuid}"); // 78ac0e14-0f2b-529e-81e2-a0f50f6029c5
    Ok(())
}
