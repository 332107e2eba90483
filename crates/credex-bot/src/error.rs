//! Error types for the credex daemon.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error(transparent)]
    Core(#[from] credex_core::CoreError),

    #[error(transparent)]
    Strategy(#[from] credex_strategy::StrategyError),

    #[error(transparent)]
    Persistence(#[from] credex_persistence::PersistenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
