//! Server command implementation

use anyhow::{Context, Result};
use pennywise_core::ServiceConfig;

/// Load config from the environment and apply command-line overrides
pub fn resolve_config(
    mut config: ServiceConfig,
    port: Option<u16>,
    host: Option<&str>,
    backend_url: Option<&str>,
) -> ServiceConfig {
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host.to_string();
    }
    if let Some(url) = backend_url {
        config = config.with_backend_url(url);
    }
    config
}

pub async fn cmd_serve(
    port: Option<u16>,
    host: Option<&str>,
    backend_url: Option<&str>,
) -> Result<()> {
    let config = ServiceConfig::from_env().context("Invalid service configuration")?;
    let config = resolve_config(config, port, host, backend_url);

    println!("🚀 Starting {}...", pennywise_server::SERVICE_NAME);
    println!("   Listening: http://{}:{}", config.host, config.port);
    println!("   Environment: {}", config.environment);
    match config.backend_url {
        Some(ref url) => println!("   Backend: {}", url),
        None => println!("   Backend: (not configured, set BACKEND_URL or --backend-url)"),
    }
    println!();

    pennywise_server::serve(config).await
}
