//! Background reconciliation and periodic task supervision

mod engine;
mod supervisor;

pub use engine::{ExpirySweep, ReconcileEngine};
pub use supervisor::{JobError, Supervisor};
