//! Kiln Daemon - Node provisioning lifecycle service
//!
//! The kiln daemon provides:
//! - REST API for active model instance and node management
//! - Audit log views over instance state history
//! - Periodic reconciliation of expired node registrations

use clap::Parser;
use kiln_daemon::config::DaemonConfig;
use kiln_daemon::error::{DaemonError, DaemonResult};
use kiln_daemon::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Kiln Daemon CLI
#[derive(Parser)]
#[command(name = "kilnd")]
#[command(about = "Kiln Daemon - Node provisioning lifecycle service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "KILN_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "KILN_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "KILN_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "KILN_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config =
        DaemonConfig::load(cli.config.as_deref()).map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }

    println!(
        r#"
  _  ___ _
 | |/ (_) |_ __
 | ' /| | | '_ \
 | . \| | | | | |
 |_|\_\_|_|_| |_|

  Kiln - Node Provisioning Lifecycle Daemon
  Version: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config)?;
    server.run().await
}
