//! Error types for credex-strategy.

use thiserror::Error;

/// Strategy error types.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Invalid strategy config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Book(#[from] credex_book::BookError),

    #[error(transparent)]
    Core(#[from] credex_core::CoreError),
}

/// Result type alias for strategy operations.
pub type Result<T> = std::result::Result<T, StrategyError>;
