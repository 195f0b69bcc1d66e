//! API request handlers

mod active_models;
mod health;
mod nodes;
mod templates;

pub use active_models::*;
pub use health::*;
pub use nodes::*;
pub use templates::*;
