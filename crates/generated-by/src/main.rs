//! generated-by server: answers HTTP requests with an `X-Generated-By`
//! fingerprint of the serving instance.

use generated_by::config::AppConfig;
use generated_by::server;

fn main() -> anyhow::Result<()> {
    // Determine config path
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        // Check for --config flag first
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            // Fall back to positional arg
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("GENERATED_BY_CONFIG").ok())
            .unwrap_or_else(|| "generated-by.toml".to_string())
    };

    let config = AppConfig::load(&config_path)?;

    // Build the tokio runtime first: the tonic gRPC exporter needs a reactor context
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let tracing_guard = generated_by_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            server_addr = ?config.server.server_addr,
            server_name = ?config.server.server_name,
            otlp_export = tracing_guard.is_exporting(),
            "Starting generated-by"
        );

        server::run(config).await
    })
}
