//! Kiln Types - Core types for the node provisioning lifecycle
//!
//! Kiln tracks a fleet of provisionable compute nodes through their
//! deployment lifecycle. This crate holds the domain types shared by the
//! registry and the daemon:
//!
//! - **Node**: a compute node known from its check-ins
//! - **ModelTemplate**: what is being deployed onto a node (hypervisor/OS)
//! - **AuditLog**: the append-only transition history of a deployment
//! - **ActiveModelInstance**: the live binding of a node to a template plus
//!   its history
//!
//! Nothing here performs I/O; storage and scheduling live in `kiln-registry`
//! and `kiln-daemon`.

#![deny(unsafe_code)]

pub mod error;
pub mod ids;
pub mod instance;
pub mod log;
pub mod node;
pub mod template;

pub use error::{Result, TypeError};
pub use ids::{InstanceId, NodeId};
pub use instance::ActiveModelInstance;
pub use log::{render_entries, AuditLog, LogEntry, LogEntryView};
pub use node::Node;
pub use template::{ModelTemplate, TemplateConfig, TemplateKind};
