//! Application configuration.

use crate::error::{AppError, AppResult};
use credex_book::SettlementConfig;
use credex_core::MarketKey;
use credex_inventory::SourceKind;
use credex_strategy::StrategyConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade journal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for daily journal files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Records buffered before a flush.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// One upstream credit grant seeded into a bot's queue at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotSeed {
    pub source_kind: SourceKind,
    pub credits: u64,
}

/// One bot to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Human-readable name, used only in logs.
    pub name: String,
    /// Market key in `catchment:unit` form.
    pub market: String,
    /// Opening cash balance for the bot's trading account.
    #[serde(default)]
    pub opening_balance: Decimal,
    pub strategy: StrategyConfig,
    /// Inventory assigned at startup.
    #[serde(default)]
    pub lots: Vec<LotSeed>,
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub settlement: SettlementConfig,

    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            persistence: PersistenceConfig::default(),
            settlement: SettlementConfig::default(),
            bots: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(std::path::Path::new(path)))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate everything a tick would otherwise trip over at runtime.
    pub fn validate(&self) -> AppResult<()> {
        if self.tick_interval_secs == 0 {
            return Err(AppError::Config(
                "tick_interval_secs must be positive".to_string(),
            ));
        }
        for bot in &self.bots {
            MarketKey::parse(&bot.market).map_err(|e| {
                AppError::Config(format!("bot {}: bad market key: {e}", bot.name))
            })?;
            bot.strategy.validate().map_err(|e| {
                AppError::Config(format!("bot {}: {e}", bot.name))
            })?;
        }
        Ok(())
    }
}

fn default_tick_interval_secs() -> u64 {
    30
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_buffer_size() -> usize {
    64
}
