//! Reference price calculation.
//!
//! Shared by both strategies. Priority order:
//! 1. Recency-weighted average of the last 10 trades (weight `10 - i` for
//!    the i-th most recent).
//! 2. Midpoint of best bid and best ask when both exist.
//! 3. A single existing side offset by half the spread.
//! 4. The configured base price.

use credex_book::MarketSnapshot;
use credex_core::Price;
use rust_decimal::Decimal;

/// How many recent trades feed the weighted average.
pub const TRADE_WINDOW: usize = 10;

/// Compute the reference price for a market.
///
/// `spread` is the effective spread fraction (already widened for a
/// zero-trade market); it only matters when exactly one side is quoted.
pub fn reference_price(snapshot: &MarketSnapshot, spread: Decimal, base_price: Price) -> Price {
    if !snapshot.recent_trades.is_empty() {
        let mut weighted = Decimal::ZERO;
        let mut weights = Decimal::ZERO;
        for (i, trade) in snapshot.recent_trades.iter().take(TRADE_WINDOW).enumerate() {
            let weight = Decimal::from((TRADE_WINDOW - i) as u64);
            weighted += trade.price.inner() * weight;
            weights += weight;
        }
        return Price::new(weighted / weights);
    }

    let half_spread = spread / Decimal::TWO;
    match (snapshot.best_bid, snapshot.best_ask) {
        (Some(bid), Some(ask)) => Price::new((bid.inner() + ask.inner()) / Decimal::TWO),
        (Some(bid), None) => Price::new(bid.inner() * (Decimal::ONE + half_spread)),
        (None, Some(ask)) => Price::new(ask.inner() * (Decimal::ONE - half_spread)),
        (None, None) => base_price,
    }
}
