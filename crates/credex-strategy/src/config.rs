//! Strategy configuration.
//!
//! Closed, typed configuration per bot kind, validated when the bot is
//! registered rather than re-validated every tick.

use crate::error::{Result, StrategyError};
use credex_core::{Credits, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market-making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Full spread as a fraction of the reference price (0.04 = 4%).
    #[serde(default = "default_spread_pct")]
    pub spread_pct: Decimal,

    /// Spread multiplier applied while the market has zero trades
    /// (price discovery is uncertain, quote wider).
    #[serde(default = "default_new_market_spread_multiplier")]
    pub new_market_spread_multiplier: Decimal,

    /// Below this inventory ratio the bot is short on sellable credits:
    /// spread widens and the bot bids to replenish.
    #[serde(default = "default_inventory_low_threshold")]
    pub inventory_low_threshold: Decimal,

    /// Above this inventory ratio the bot is inventory-heavy: spread
    /// narrows and the bot offers.
    #[serde(default = "default_inventory_high_threshold")]
    pub inventory_high_threshold: Decimal,

    /// Orders below this size are not placed.
    #[serde(default = "default_min_order_size")]
    pub min_order_size: Credits,

    /// Orders are capped at this size.
    #[serde(default = "default_max_order_size")]
    pub max_order_size: Credits,

    /// Reference price of last resort for a market with no trades and no
    /// quotes.
    #[serde(default = "default_base_price")]
    pub base_price: Price,

    /// Fraction of total available inventory offered per tick.
    #[serde(default = "default_inventory_fraction")]
    pub inventory_fraction: Decimal,
}

impl MakerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spread_pct <= Decimal::ZERO || self.spread_pct > Decimal::ONE {
            return Err(StrategyError::InvalidConfig(format!(
                "spread_pct must be in (0, 1], got {}",
                self.spread_pct
            )));
        }
        if self.new_market_spread_multiplier < Decimal::ONE {
            return Err(StrategyError::InvalidConfig(format!(
                "new_market_spread_multiplier must be >= 1, got {}",
                self.new_market_spread_multiplier
            )));
        }
        if self.inventory_low_threshold <= Decimal::ZERO
            || self.inventory_high_threshold >= Decimal::ONE
            || self.inventory_low_threshold >= self.inventory_high_threshold
        {
            return Err(StrategyError::InvalidConfig(format!(
                "inventory thresholds must satisfy 0 < low < high < 1, got {} / {}",
                self.inventory_low_threshold, self.inventory_high_threshold
            )));
        }
        if self.min_order_size.is_zero() {
            return Err(StrategyError::InvalidConfig(
                "min_order_size must be positive".to_string(),
            ));
        }
        if self.max_order_size < self.min_order_size {
            return Err(StrategyError::InvalidConfig(format!(
                "max_order_size {} below min_order_size {}",
                self.max_order_size, self.min_order_size
            )));
        }
        if !self.base_price.is_positive() {
            return Err(StrategyError::InvalidConfig(format!(
                "base_price must be positive, got {}",
                self.base_price
            )));
        }
        if self.inventory_fraction <= Decimal::ZERO || self.inventory_fraction > Decimal::ONE {
            return Err(StrategyError::InvalidConfig(format!(
                "inventory_fraction must be in (0, 1], got {}",
                self.inventory_fraction
            )));
        }
        Ok(())
    }
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            spread_pct: default_spread_pct(),
            new_market_spread_multiplier: default_new_market_spread_multiplier(),
            inventory_low_threshold: default_inventory_low_threshold(),
            inventory_high_threshold: default_inventory_high_threshold(),
            min_order_size: default_min_order_size(),
            max_order_size: default_max_order_size(),
            base_price: default_base_price(),
            inventory_fraction: default_inventory_fraction(),
        }
    }
}

/// Sell-ladder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Number of price levels the ladder maintains.
    #[serde(default = "default_levels")]
    pub levels: u32,

    /// Per-level price increment as a fraction of the reference price
    /// (0.01 = 1% per level).
    #[serde(default = "default_increment_pct")]
    pub increment_pct: Decimal,

    /// Credits offered at each level.
    #[serde(default = "default_size_per_level")]
    pub size_per_level: Credits,

    /// Explicit reference override used while the market has no trades,
    /// to seed its first trades deterministically.
    #[serde(default)]
    pub starting_price: Option<Price>,

    /// Reference price of last resort (no trades, no quotes, no override).
    #[serde(default = "default_base_price")]
    pub base_price: Price,

    /// Spread used for the single-sided reference offset.
    #[serde(default = "default_spread_pct")]
    pub spread_pct: Decimal,

    /// Levels that cannot draw at least this much inventory are skipped.
    #[serde(default = "default_ladder_min_order_size")]
    pub min_order_size: Credits,
}

impl LadderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.levels == 0 {
            return Err(StrategyError::InvalidConfig(
                "levels must be at least 1".to_string(),
            ));
        }
        if self.increment_pct <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(format!(
                "increment_pct must be positive, got {}",
                self.increment_pct
            )));
        }
        if self.size_per_level.is_zero() {
            return Err(StrategyError::InvalidConfig(
                "size_per_level must be positive".to_string(),
            ));
        }
        if let Some(price) = self.starting_price {
            if !price.is_positive() {
                return Err(StrategyError::InvalidConfig(format!(
                    "starting_price must be positive, got {price}"
                )));
            }
        }
        if !self.base_price.is_positive() {
            return Err(StrategyError::InvalidConfig(format!(
                "base_price must be positive, got {}",
                self.base_price
            )));
        }
        if self.spread_pct <= Decimal::ZERO || self.spread_pct > Decimal::ONE {
            return Err(StrategyError::InvalidConfig(format!(
                "spread_pct must be in (0, 1], got {}",
                self.spread_pct
            )));
        }
        if self.min_order_size.is_zero() {
            return Err(StrategyError::InvalidConfig(
                "min_order_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            increment_pct: default_increment_pct(),
            size_per_level: default_size_per_level(),
            starting_price: None,
            base_price: default_base_price(),
            spread_pct: default_spread_pct(),
            min_order_size: default_ladder_min_order_size(),
        }
    }
}

/// Per-bot strategy selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    MarketMaker(MakerConfig),
    SellLadder(LadderConfig),
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::MarketMaker(c) => c.validate(),
            Self::SellLadder(c) => c.validate(),
        }
    }

    /// Stable label for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MarketMaker(_) => "market_maker",
            Self::SellLadder(_) => "sell_ladder",
        }
    }
}

fn default_spread_pct() -> Decimal {
    Decimal::new(4, 2) // 4%
}
fn default_new_market_spread_multiplier() -> Decimal {
    Decimal::TWO
}
fn default_inventory_low_threshold() -> Decimal {
    Decimal::new(3, 1) // 0.3
}
fn default_inventory_high_threshold() -> Decimal {
    Decimal::new(7, 1) // 0.7
}
fn default_min_order_size() -> Credits {
    Credits::new(100)
}
fn default_max_order_size() -> Credits {
    Credits::new(100_000)
}
fn default_base_price() -> Price {
    Price::ONE
}
fn default_inventory_fraction() -> Decimal {
    Decimal::new(1, 1) // 0.1
}
fn default_levels() -> u32 {
    3
}
fn default_increment_pct() -> Decimal {
    Decimal::new(1, 2) // 1%
}
fn default_size_per_level() -> Credits {
    Credits::new(1000)
}
fn default_ladder_min_order_size() -> Credits {
    Credits::new(1)
}
