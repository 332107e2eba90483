//! Error types for credex-book.

use credex_core::OrderId;
use thiserror::Error;

/// Matching engine error types.
#[derive(Debug, Error)]
pub enum BookError {
    /// Bad quantity/price/kind combination. Rejected before any book
    /// mutation.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// MARKET order that matched nothing. The order has been cancelled and
    /// no trade was created.
    #[error("No liquidity for market order {0}")]
    NoLiquidity(OrderId),

    #[error(transparent)]
    Core(#[from] credex_core::CoreError),
}

/// Result type alias for matching operations.
pub type Result<T> = std::result::Result<T, BookError>;
