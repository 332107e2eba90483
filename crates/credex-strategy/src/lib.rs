//! Autonomous trading strategies for credex bots.
//!
//! Two strategy engines share the same tick contract:
//! - Market-making: quote both sides around a reference price, spread
//!   adjusted by the bot's inventory ratio.
//! - Sell-ladder: one resting sell per ascending price level; filled levels
//!   are replaced by a new level above the current top.
//!
//! # Architecture
//!
//! ```text
//! Scheduler tick → StrategyEngine.run_tick()
//!                   └─ per active bot: evaluate
//!                        ├─ MatchingEngine: snapshot / cancel / submit
//!                        └─ InventoryBook:  ratio / take (sell funding)
//! ```

pub mod bot;
pub mod config;
pub mod engine;
pub mod error;
pub mod ladder;
pub mod maker;
pub mod reference;

pub use bot::Bot;
pub use config::{LadderConfig, MakerConfig, StrategyConfig};
pub use engine::StrategyEngine;
pub use error::{Result, StrategyError};
pub use ladder::LadderStrategy;
pub use maker::MakerStrategy;
pub use reference::reference_price;
