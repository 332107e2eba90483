//! External collaborator traits and settlement policy.
//!
//! The matching engine owns the matching algorithm; balance lookups and
//! asset transfers are injected so matching is testable without either.

use credex_core::{AccountId, Credits, MarketKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spendable balance lookup, net of holds. Used only by the buy-side
/// affordability check during fill execution.
#[cfg_attr(test, mockall::automock)]
pub trait BalanceOracle: Send + Sync {
    fn available(&self, account: AccountId, market: &MarketKey) -> Decimal;
}

/// Ledger transfer failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Unknown account reference: {0}")]
    UnknownAccount(String),
}

/// Executes the actual asset transfer for a fill and returns a settlement
/// reference. The engine does not know how transfers are signed or
/// broadcast.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerService: Send + Sync {
    fn transfer(
        &self,
        seller_ref: &str,
        buyer_ref: &str,
        market: &MarketKey,
        quantity: Credits,
    ) -> std::result::Result<String, LedgerError>;
}

/// What to do with a fill whose ledger transfer keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Keep the trade, marked settlement-pending, and carry on matching.
    #[default]
    RecordPending,
    /// Stop the walk at the failing fill; no trade is recorded for it.
    Block,
}

/// Settlement execution knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    #[serde(default)]
    pub policy: SettlementPolicy,

    /// Total transfer attempts per fill (>= 1).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Linear backoff step between attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            policy: SettlementPolicy::default(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    50
}
