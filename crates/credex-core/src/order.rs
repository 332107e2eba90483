//! Order entity and fill bookkeeping.
//!
//! Orders are created PENDING, mutated only by the matching engine (fills)
//! or an explicit cancel, and stop mutating once FILLED or CANCELLED.
//! Invariant: `filled + remaining == quantity` after every mutation.

use crate::error::{CoreError, Result};
use crate::ids::{AccountId, BotId, LotId, OrderId};
use crate::market::MarketKey;
use crate::numeric::{Credits, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Limit order: rests at its price.
    Limit,
    /// Market order: fills at whatever the book offers, never rests.
    Market,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::Market => write!(f, "market"),
        }
    }
}

/// Order lifecycle status.
///
/// Status is a pure function of `(filled, remaining)` except `Cancelled`,
/// which is a terminal override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled)
    }

    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::PartiallyFilled => write!(f, "partially_filled"),
            Self::Filled => write!(f, "filled"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Back-reference from a bot-owned sell order to the inventory lot that
/// funds it. Recorded at order creation so the matching engine can settle
/// the correct lot on a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRef {
    pub bot: BotId,
    pub lot: LotId,
}

/// An order in a credit market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account: AccountId,
    pub market: MarketKey,
    pub side: Side,
    pub kind: OrderKind,
    /// Required for LIMIT, absent for MARKET.
    pub price: Option<Price>,
    pub quantity: Credits,
    pub filled: Credits,
    pub status: OrderStatus,
    /// Opaque identifier used only by the ledger service.
    pub asset_ref: String,
    /// Inventory lot funding this order, when bot-owned.
    pub funding: Option<LotRef>,
    /// Tie-break key for price-time priority.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a LIMIT order. Fails before any state exists when the
    /// quantity is zero or the price is not positive.
    pub fn limit(
        account: AccountId,
        market: MarketKey,
        side: Side,
        price: Price,
        quantity: Credits,
        asset_ref: impl Into<String>,
    ) -> Result<Self> {
        if quantity.is_zero() {
            return Err(CoreError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        if !price.is_positive() {
            return Err(CoreError::InvalidOrder(format!(
                "limit price must be positive, got {price}"
            )));
        }
        Ok(Self::new_unchecked(
            account,
            market,
            side,
            OrderKind::Limit,
            Some(price),
            quantity,
            asset_ref.into(),
        ))
    }

    /// Create a MARKET order. Fails when the quantity is zero.
    pub fn market(
        account: AccountId,
        market: MarketKey,
        side: Side,
        quantity: Credits,
        asset_ref: impl Into<String>,
    ) -> Result<Self> {
        if quantity.is_zero() {
            return Err(CoreError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        Ok(Self::new_unchecked(
            account,
            market,
            side,
            OrderKind::Market,
            None,
            quantity,
            asset_ref.into(),
        ))
    }

    fn new_unchecked(
        account: AccountId,
        market: MarketKey,
        side: Side,
        kind: OrderKind,
        price: Option<Price>,
        quantity: Credits,
        asset_ref: String,
    ) -> Self {
        Self {
            id: OrderId::new(),
            account,
            market,
            side,
            kind,
            price,
            quantity,
            filled: Credits::ZERO,
            status: OrderStatus::Pending,
            asset_ref,
            funding: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the inventory lot funding this order.
    pub fn with_funding(mut self, funding: LotRef) -> Self {
        self.funding = Some(funding);
        self
    }

    /// Credits still unfilled.
    #[inline]
    pub fn remaining(&self) -> Credits {
        self.quantity.saturating_sub(self.filled)
    }

    /// Whether this order can still trade.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Record a fill against this order and derive the new status.
    pub fn apply_fill(&mut self, quantity: Credits) -> Result<()> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidFill(format!(
                "order {} is {}",
                self.id, self.status
            )));
        }
        if quantity.is_zero() || quantity > self.remaining() {
            return Err(CoreError::InvalidFill(format!(
                "fill of {} against remaining {}",
                quantity,
                self.remaining()
            )));
        }
        self.filled = self.filled + quantity;
        self.status = if self.remaining().is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        Ok(())
    }

    /// Cancel the order. Idempotent: returns true when the state changed,
    /// false when the order was already FILLED or CANCELLED.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = OrderStatus::Cancelled;
        true
    }
}
