//! Kiln Daemon library
//!
//! Core components of the kilnd daemon:
//! - REST API handlers and access control
//! - Reconciliation engine and scheduler supervisor
//! - Configuration and server lifecycle management

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod server;

pub use access::TrustedNetwork;
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use scheduler::{ReconcileEngine, Supervisor};
pub use server::Server;
