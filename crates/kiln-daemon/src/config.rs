//! Configuration for kiln-daemon

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Reconciliation engine configuration
    #[serde(default)]
    pub reconciler: ReconcilerConfig,

    /// Trusted operator network
    #[serde(default)]
    pub trust: TrustConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8150".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// Reconciliation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Seconds without a check-in before an unbound node expires
    #[serde(default = "default_node_expire_timeout")]
    pub node_expire_timeout_secs: u64,

    /// Interval between expiry sweeps in seconds
    #[serde(default = "default_min_cycle_time")]
    pub min_cycle_time_secs: u64,

    /// Interval between task-monitor reports in seconds
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_secs: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            node_expire_timeout_secs: default_node_expire_timeout(),
            min_cycle_time_secs: default_min_cycle_time(),
            monitor_interval_secs: default_monitor_interval(),
        }
    }
}

/// Trusted operator network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Address of the operator host
    #[serde(default = "default_server_addr")]
    pub server_addr: String,

    /// Operator subnet in CIDR form
    #[serde(default = "default_subnet_cidr")]
    pub subnet_cidr: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            subnet_cidr: default_subnet_cidr(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_node_expire_timeout() -> u64 {
    300
}

fn default_min_cycle_time() -> u64 {
    60
}

fn default_monitor_interval() -> u64 {
    300
}

fn default_server_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_subnet_cidr() -> String {
    "127.0.0.0/8".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then an optional file, then `KILN_*`
    /// environment variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("KILN")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
