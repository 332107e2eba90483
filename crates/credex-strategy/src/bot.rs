//! Bot entity shared by both strategy kinds.

use crate::config::StrategyConfig;
use crate::error::Result;
use credex_core::{AccountId, BotId, MarketKey};
use serde::{Deserialize, Serialize};

/// An autonomous trading bot. Its resting orders are derived state,
/// reconciled every tick, not stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    /// The account the bot trades as (bot-as-proxy).
    pub account: AccountId,
    pub market: MarketKey,
    pub is_active: bool,
    pub strategy: StrategyConfig,
}

impl Bot {
    /// Create a bot. The strategy config is validated here, on write,
    /// not re-validated per tick.
    pub fn new(account: AccountId, market: MarketKey, strategy: StrategyConfig) -> Result<Self> {
        strategy.validate()?;
        Ok(Self {
            id: BotId::new(),
            account,
            market,
            is_active: true,
            strategy,
        })
    }

    pub fn strategy_kind(&self) -> &'static str {
        self.strategy.kind()
    }
}
