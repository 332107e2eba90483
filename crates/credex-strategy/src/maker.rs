//! Market-making strategy.
//!
//! Every tick: cancel the bot's resting orders, recompute the reference
//! price and the inventory-adjusted spread, and quote again from scratch.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use credex_book::MatchingEngine;
use credex_core::{Credits, LotRef, Order, Price, Side};
use credex_inventory::InventoryBook;

use crate::bot::Bot;
use crate::config::MakerConfig;
use crate::error::Result;
use crate::reference::reference_price;

/// Market-making strategy engine.
pub struct MakerStrategy {
    engine: Arc<MatchingEngine>,
    inventory: Arc<InventoryBook>,
}

impl MakerStrategy {
    pub fn new(engine: Arc<MatchingEngine>, inventory: Arc<InventoryBook>) -> Self {
        Self { engine, inventory }
    }

    /// One tick of quoting for `bot`.
    pub fn evaluate(&self, bot: &Bot, config: &MakerConfig) -> Result<()> {
        // Stale quotes first, so the snapshot below does not see them.
        for order in self.engine.open_orders(bot.account, &bot.market) {
            self.engine.cancel(order.id);
        }

        let snapshot = self.engine.snapshot(&bot.market);
        let new_market = snapshot.trade_count == 0;

        // Defensive widening while price discovery is uncertain.
        let mut spread = config.spread_pct;
        if new_market {
            spread *= config.new_market_spread_multiplier;
        }

        let reference = reference_price(&snapshot, spread, config.base_price);

        // Neutral 0.5 when the bot holds no credits at all.
        let ratio = self.inventory.ratio(bot.id).unwrap_or(dec!(0.5));
        if ratio < config.inventory_low_threshold {
            spread *= dec!(1.5);
        } else if ratio > config.inventory_high_threshold {
            spread *= dec!(0.7);
        }

        let half = spread / Decimal::TWO;
        let bid_price = Price::new(reference.inner() * (Decimal::ONE - half));
        let ask_price = Price::new(reference.inner() * (Decimal::ONE + half));

        debug!(
            bot = %bot.id,
            market = %bot.market,
            %reference,
            %ratio,
            %spread,
            new_market,
            "Maker tick"
        );

        let total_available = self.inventory.total_available(bot.id);
        let desired_sell = fraction_of(config.inventory_fraction, total_available);

        if new_market {
            // Seed both sides: a sell plus a half-sized buy.
            self.place_sell(bot, config, ask_price, desired_sell)?;
            let buy_size = Credits::new(desired_sell.inner() / 2);
            self.place_buy(bot, config, bid_price, buy_size)?;
        } else if ratio < config.inventory_low_threshold {
            // Short on sellable inventory: bid to buy back a fraction of
            // what has been sold.
            let buy_size =
                fraction_of(config.inventory_fraction, self.inventory.total_taken(bot.id));
            self.place_buy(bot, config, bid_price, buy_size)?;
        } else if ratio > config.inventory_high_threshold {
            self.place_sell(bot, config, ask_price, desired_sell)?;
        }

        Ok(())
    }

    fn place_sell(
        &self,
        bot: &Bot,
        config: &MakerConfig,
        price: Price,
        desired: Credits,
    ) -> Result<bool> {
        let desired = desired.min(config.max_order_size);
        if desired < config.min_order_size {
            debug!(bot = %bot.id, %desired, "Sell below minimum size, skipped");
            return Ok(false);
        }
        let grant = match self.inventory.take(bot.id, desired) {
            Some(grant) => grant,
            None => {
                debug!(bot = %bot.id, "Inventory queue dry, sell skipped");
                return Ok(false);
            }
        };
        if grant.credits < config.min_order_size {
            debug!(bot = %bot.id, granted = %grant.credits, "Grant below minimum size, sell skipped");
            return Ok(false);
        }

        let order = Order::limit(
            bot.account,
            bot.market.clone(),
            Side::Sell,
            price,
            grant.credits,
            bot.account.to_string(),
        )?
        .with_funding(LotRef {
            bot: bot.id,
            lot: grant.lot,
        });
        let submission = self.engine.submit(order)?;
        debug!(
            bot = %bot.id,
            order = %submission.order.id,
            %price,
            size = %grant.credits,
            lot = %grant.lot,
            "Maker sell placed"
        );
        Ok(true)
    }

    fn place_buy(
        &self,
        bot: &Bot,
        config: &MakerConfig,
        price: Price,
        size: Credits,
    ) -> Result<bool> {
        let size = size.min(config.max_order_size);
        if size < config.min_order_size {
            debug!(bot = %bot.id, %size, "Buy below minimum size, skipped");
            return Ok(false);
        }

        let order = Order::limit(
            bot.account,
            bot.market.clone(),
            Side::Buy,
            price,
            size,
            bot.account.to_string(),
        )?;
        let submission = self.engine.submit(order)?;
        debug!(
            bot = %bot.id,
            order = %submission.order.id,
            %price,
            %size,
            "Maker buy placed"
        );
        Ok(true)
    }
}

/// `fraction × credits`, floored to whole credits.
fn fraction_of(fraction: Decimal, credits: Credits) -> Credits {
    Credits::new(
        (fraction * credits.as_decimal())
            .floor()
            .to_u64()
            .unwrap_or(0),
    )
}
