//! Append-only trade persistence.
//!
//! Uses JSON Lines format (.jsonl) for robustness: each line is a complete
//! JSON object, so partial file corruption only affects individual lines and
//! interrupted writes stay readable.

pub mod error;
pub mod journal;

pub use error::{PersistenceError, PersistenceResult};
pub use journal::{TradeJournal, TradeRecord};
