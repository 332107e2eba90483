//! Error types for credex-inventory.

use credex_core::{BotId, Credits, LotId};
use thiserror::Error;

/// Inventory error types.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Settle asked for more than the lot has available. `take` and
    /// `settle` paired correctly never produce this.
    #[error("Overdraw on lot {lot}: requested {requested}, available {available}")]
    Overdraw {
        lot: LotId,
        requested: Credits,
        available: Credits,
    },

    #[error("Unknown bot: {0}")]
    UnknownBot(BotId),

    #[error("Unknown lot: {0}")]
    UnknownLot(LotId),
}

/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
