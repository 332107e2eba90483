//! Per-market resting book state.
//!
//! One `MarketBook` per market key, always accessed under that key's mutex.
//! Terminal orders stay in the map so status queries and idempotent cancels
//! keep working after the fact.

use credex_core::{AccountId, Order, OrderId, Price, Side, Trade};
use std::collections::{HashMap, VecDeque};

/// How many executed trades each market retains for reference pricing.
pub const RECENT_TRADES_CAP: usize = 32;

/// Read-only market state handed to strategies.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    /// Highest open bid price.
    pub best_bid: Option<Price>,
    /// Lowest open ask price.
    pub best_ask: Option<Price>,
    /// Most recent trades, newest first. Bounded by `RECENT_TRADES_CAP`.
    pub recent_trades: Vec<Trade>,
    /// Lifetime trade count for the market (not bounded).
    pub trade_count: u64,
}

#[derive(Debug, Default)]
pub(crate) struct MarketBook {
    orders: HashMap<OrderId, Order>,
    recent_trades: VecDeque<Trade>,
    trade_count: u64,
}

impl MarketBook {
    pub(crate) fn insert(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub(crate) fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub(crate) fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    /// Open resting orders on `side`, excluding `exclude`. Cloned so the
    /// pure planning step can run without holding references into the map.
    pub(crate) fn open_candidates(&self, side: Side, exclude: OrderId) -> Vec<Order> {
        self.orders
            .values()
            .filter(|o| o.side == side && o.is_open() && o.id != exclude)
            .cloned()
            .collect()
    }

    pub(crate) fn best_price(&self, side: Side) -> Option<Price> {
        let prices = self
            .orders
            .values()
            .filter(|o| o.side == side && o.is_open())
            .filter_map(|o| o.price);
        match side {
            Side::Buy => prices.max(),
            Side::Sell => prices.min(),
        }
    }

    pub(crate) fn open_orders_for(&self, account: AccountId) -> Vec<Order> {
        self.orders
            .values()
            .filter(|o| o.account == account && o.is_open())
            .cloned()
            .collect()
    }

    pub(crate) fn open_count(&self, side: Side) -> usize {
        self.orders
            .values()
            .filter(|o| o.side == side && o.is_open())
            .count()
    }

    pub(crate) fn record_trade(&mut self, trade: Trade) {
        self.recent_trades.push_front(trade);
        self.recent_trades.truncate(RECENT_TRADES_CAP);
        self.trade_count += 1;
    }

    pub(crate) fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            best_bid: self.best_price(Side::Buy),
            best_ask: self.best_price(Side::Sell),
            recent_trades: self.recent_trades.iter().cloned().collect(),
            trade_count: self.trade_count,
        }
    }
}
