//! Price-time priority matching engine.
//!
//! Turns a new order into zero-or-more trades against the resting book for
//! its market key. Matching is split into a pure planning step (no I/O) and
//! an execution step that performs the buyer affordability check, the ledger
//! transfer and the inventory settlement per fill.
//!
//! # Architecture
//!
//! ```text
//! submit(order)
//!   ├─ validate quantity/kind/price (rejected before any mutation)
//!   ├─ lock market book (one mutex per market key)
//!   ├─ plan::plan_fills(): pure walk over sorted candidates
//!   └─ execute fills in order: balance check, ledger transfer, trade,
//!      order fill state, inventory settle, journal
//! ```

pub mod book;
pub mod engine;
pub mod error;
pub mod plan;
pub mod traits;

pub use book::{MarketSnapshot, RECENT_TRADES_CAP};
pub use engine::{CancelOutcome, MatchingEngine, Submission};
pub use error::{BookError, Result};
pub use plan::FillIntent;
pub use traits::{
    BalanceOracle, LedgerError, LedgerService, SettlementConfig, SettlementPolicy,
};
