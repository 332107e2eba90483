//! Per-bot FIFO inventory queue.
//!
//! Tracks which upstream credit grants (client mandates or house holdings)
//! a bot has consumed, in what order, and how much remains. Pure data
//! structure logic, no I/O.

pub mod error;
pub mod lot;
pub mod queue;

pub use error::{InventoryError, Result};
pub use lot::{Lot, SourceKind};
pub use queue::{Grant, InventoryBook};
