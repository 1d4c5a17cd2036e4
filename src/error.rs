//! Crate-level error type

use crate::context::BudgetError;
use thiserror::Error;

/// Result alias used by configuration, logging and metrics setup
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors raised while wiring up the context budget subsystem
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
