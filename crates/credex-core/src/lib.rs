//! Core domain types for the credex credit exchange.
//!
//! This crate provides fundamental types used throughout the exchange:
//! - `MarketKey`: Unique identifier for a credit market (catchment + unit type)
//! - `Price`, `Credits`: Precision-safe numeric types
//! - `Order`, `Trade`: Order book entities with fill bookkeeping
//! - `Side`, `OrderKind`, `OrderStatus`: Trading enums

pub mod error;
pub mod ids;
pub mod market;
pub mod numeric;
pub mod order;
pub mod trade;

pub use error::{CoreError, Result};
pub use ids::{AccountId, BotId, LotId, OrderId, SourceId, TradeId};
pub use market::{Catchment, MarketKey, UnitType};
pub use numeric::{Credits, Price};
pub use order::{LotRef, Order, OrderKind, OrderStatus, Side};
pub use trade::{SettlementStatus, Trade};
