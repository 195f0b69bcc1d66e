//! Domain type errors

use thiserror::Error;

/// Errors raised while constructing or parsing domain types
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("unknown model template kind: {0}")]
    UnknownTemplateKind(String),
}

/// Result type for domain type operations
pub type Result<T> = std::result::Result<T, TypeError>;
