//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("max_outcomes must be at least 1")]
    InvalidMaxOutcomes,

    #[error("max_bound must be at least 1")]
    InvalidMaxBound,

    #[error("Log filter directive is empty")]
    EmptyLogFilter,
}

/// Errors that can occur while installing the tracing subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter directive: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}
