//! Sell-ladder strategy.
//!
//! Maintains one resting sell per ascending price level. A fully filled
//! level is never re-posted: a brand-new order goes in one level above the
//! current top, at the current reference price, so the ladder rises as the
//! market absorbs liquidity. Growth is capped at twice the configured level
//! count.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use credex_book::MatchingEngine;
use credex_core::{BotId, LotRef, Order, OrderId, OrderStatus, Price, Side};
use credex_inventory::InventoryBook;

use crate::bot::Bot;
use crate::config::LadderConfig;
use crate::error::Result;
use crate::reference::reference_price;

/// Per-bot ladder bookkeeping, reconciled against engine state every tick.
#[derive(Debug, Default)]
struct LadderState {
    /// Level → resting order currently covering it.
    orders: HashMap<u32, OrderId>,
    /// Levels whose orders fully filled; never re-posted.
    spent: HashSet<u32>,
    /// Highest level ever posted.
    max_level: u32,
}

/// Sell-ladder strategy engine.
pub struct LadderStrategy {
    engine: Arc<MatchingEngine>,
    inventory: Arc<InventoryBook>,
    states: Mutex<HashMap<BotId, LadderState>>,
}

impl LadderStrategy {
    pub fn new(engine: Arc<MatchingEngine>, inventory: Arc<InventoryBook>) -> Self {
        Self {
            engine,
            inventory,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// One tick of ladder maintenance for `bot`.
    pub fn evaluate(&self, bot: &Bot, config: &LadderConfig) -> Result<()> {
        let mut states = self.states.lock();
        let state = states.entry(bot.id).or_default();

        let snapshot = self.engine.snapshot(&bot.market);
        let reference = match (config.starting_price, snapshot.trade_count) {
            // Deterministic seed until the market prints its first trade.
            (Some(seed), 0) => seed,
            _ => reference_price(&snapshot, config.spread_pct, config.base_price),
        };

        // Reconcile tracked orders with engine state.
        let mut filled_levels = 0u32;
        for (level, order_id) in state.orders.clone() {
            match self.engine.order(order_id).map(|o| o.status) {
                Some(OrderStatus::Filled) => {
                    state.orders.remove(&level);
                    state.spent.insert(level);
                    filled_levels += 1;
                    debug!(bot = %bot.id, level, "Ladder level filled");
                }
                Some(OrderStatus::Cancelled) | None => {
                    // Cancelled out from under us (deactivation, manual
                    // cancel); the level is re-posted below.
                    state.orders.remove(&level);
                }
                _ => {}
            }
        }

        // Base rungs 1..=levels, minus spent ones.
        for level in 1..=config.levels {
            if state.orders.contains_key(&level) || state.spent.contains(&level) {
                continue;
            }
            self.post_level(bot, config, state, level, reference)?;
        }

        // One new rung above the top per filled level, bounded at 2× the
        // configured count.
        let cap = config.levels * 2;
        for _ in 0..filled_levels {
            let next = state.max_level + 1;
            if next > cap {
                debug!(bot = %bot.id, cap, "Ladder growth bound reached");
                break;
            }
            self.post_level(bot, config, state, next, reference)?;
        }

        Ok(())
    }

    /// Forget per-bot state (used when a bot is retired).
    pub fn clear(&self, bot: BotId) {
        self.states.lock().remove(&bot);
    }

    fn post_level(
        &self,
        bot: &Bot,
        config: &LadderConfig,
        state: &mut LadderState,
        level: u32,
        reference: Price,
    ) -> Result<()> {
        let grant = match self.inventory.take(bot.id, config.size_per_level) {
            Some(grant) => grant,
            None => {
                warn!(bot = %bot.id, level, "Inventory queue dry, ladder level skipped");
                return Ok(());
            }
        };
        if grant.credits < config.min_order_size {
            warn!(
                bot = %bot.id,
                level,
                granted = %grant.credits,
                "Grant below minimum size, ladder level skipped"
            );
            return Ok(());
        }

        let price = Price::new(
            reference.inner()
                * (Decimal::ONE + config.increment_pct * Decimal::from(level)),
        );
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
            level,
            order = %submission.order.id,
            %price,
            size = %grant.credits,
            "Ladder level posted"
        );
        state.orders.insert(level, submission.order.id);
        state.max_level = state.max_level.max(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use credex_book::{BalanceOracle, LedgerError, LedgerService, SettlementConfig};
    use credex_core::{AccountId, Catchment, Credits, MarketKey, SourceId, UnitType};
    use credex_inventory::SourceKind;
    use rust_decimal_macros::dec;

    struct OpenOracle;

    impl BalanceOracle for OpenOracle {
        fn available(&self, _account: AccountId, _market: &MarketKey) -> Decimal {
            Decimal::MAX
        }
    }

    struct StubLedger;

    impl LedgerService for StubLedger {
        fn transfer(
            &self,
            _seller_ref: &str,
            _buyer_ref: &str,
            _market: &MarketKey,
            _quantity: Credits,
        ) -> std::result::Result<String, LedgerError> {
            Ok("txn-test".to_string())
        }
    }

    fn mk() -> MarketKey {
        MarketKey::new(Catchment::new("manawatu").unwrap(), UnitType::Phosphate)
    }

    fn setup() -> (Arc<MatchingEngine>, Arc<InventoryBook>, LadderStrategy) {
        let inventory = Arc::new(InventoryBook::new());
        let engine = Arc::new(MatchingEngine::new(
            Arc::new(OpenOracle),
            Arc::new(StubLedger),
            inventory.clone(),
            SettlementConfig {
                retry_attempts: 1,
                retry_backoff_ms: 0,
                ..Default::default()
            },
        ));
        let ladder = LadderStrategy::new(engine.clone(), inventory.clone());
        (engine, inventory, ladder)
    }

    fn ladder_bot(config: &LadderConfig) -> Bot {
        Bot::new(
            AccountId::new(),
            mk(),
            StrategyConfig::SellLadder(config.clone()),
        )
        .unwrap()
    }

    fn seeded_config() -> LadderConfig {
        LadderConfig {
            levels: 3,
            increment_pct: dec!(0.01),
            size_per_level: Credits::new(1000),
            starting_price: Some(Price::new(dec!(1.00))),
            ..Default::default()
        }
    }

    fn open_prices(engine: &MatchingEngine, bot: &Bot) -> Vec<Price> {
        let mut prices: Vec<Price> = engine
            .open_orders(bot.account, &mk())
            .iter()
            .filter_map(|o| o.price)
            .collect();
        prices.sort();
        prices
    }

    fn buy(engine: &MatchingEngine, price: Decimal, qty: u64) {
        let order = Order::limit(
            AccountId::new(),
            mk(),
            Side::Buy,
            Price::new(price),
            Credits::new(qty),
            "buyer",
        )
        .unwrap();
        engine.submit(order).unwrap();
    }

    #[test]
    fn test_initial_ladder_from_starting_price() {
        let (engine, inventory, ladder) = setup();
        let config = seeded_config();
        let bot = ladder_bot(&config);
        inventory.add_lot(
            bot.id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(10_000),
        );

        ladder.evaluate(&bot, &config).unwrap();

        // 1% increments off the £1.00 seed.
        assert_eq!(
            open_prices(&engine, &bot),
            vec![
                Price::new(dec!(1.01)),
                Price::new(dec!(1.02)),
                Price::new(dec!(1.03)),
            ]
        );
        for order in engine.open_orders(bot.account, &mk()) {
            assert_eq!(order.quantity, Credits::new(1000));
            assert!(order.funding.is_some());
        }
    }

    #[test]
    fn test_filled_level_spawns_above_top() {
        let (engine, inventory, ladder) = setup();
        let config = seeded_config();
        let bot = ladder_bot(&config);
        inventory.add_lot(
            bot.id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(10_000),
        );

        ladder.evaluate(&bot, &config).unwrap();
        // Take out level 1 entirely.
        buy(&engine, dec!(1.01), 1000);

        ladder.evaluate(&bot, &config).unwrap();

        // Level 1 not re-posted; a new level 4 appears at the current
        // reference (the £1.01 trade), untouched levels 2-3 stay.
        let prices = open_prices(&engine, &bot);
        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0], Price::new(dec!(1.02)));
        assert_eq!(prices[1], Price::new(dec!(1.03)));
        // Level 4: 1.01 × (1 + 0.01 × 4).
        assert_eq!(prices[2], Price::new(dec!(1.01) * dec!(1.04)));
    }

    #[test]
    fn test_partial_fill_leaves_level_in_place() {
        let (engine, inventory, ladder) = setup();
        let config = seeded_config();
        let bot = ladder_bot(&config);
        inventory.add_lot(
            bot.id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(10_000),
        );

        ladder.evaluate(&bot, &config).unwrap();
        buy(&engine, dec!(1.01), 400);

        ladder.evaluate(&bot, &config).unwrap();

        // Still three rungs, nothing spawned above.
        let open = engine.open_orders(bot.account, &mk());
        assert_eq!(open.len(), 3);
        let level1 = open
            .iter()
            .find(|o| o.price == Some(Price::new(dec!(1.01))))
            .unwrap();
        assert_eq!(level1.status, OrderStatus::PartiallyFilled);
        assert_eq!(level1.remaining(), Credits::new(600));
    }

    #[test]
    fn test_growth_bounded_at_twice_levels() {
        let (engine, inventory, ladder) = setup();
        let config = LadderConfig {
            levels: 1,
            ..seeded_config()
        };
        let bot = ladder_bot(&config);
        inventory.add_lot(
            bot.id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(100_000),
        );

        // Fill whatever rests, re-evaluate, repeat well past the cap.
        for _ in 0..5 {
            ladder.evaluate(&bot, &config).unwrap();
            for order in engine.open_orders(bot.account, &mk()) {
                buy(
                    &engine,
                    order.price.unwrap().inner(),
                    order.remaining().inner(),
                );
            }
        }
        ladder.evaluate(&bot, &config).unwrap();

        // Cap is 2 × 1 = 2 levels ever posted; once both are spent the
        // ladder stays empty.
        assert!(engine.open_orders(bot.account, &mk()).is_empty());
        assert_eq!(engine.snapshot(&mk()).trade_count, 2);
    }

    #[test]
    fn test_cancelled_level_re_posted() {
        let (engine, inventory, ladder) = setup();
        let config = seeded_config();
        let bot = ladder_bot(&config);
        inventory.add_lot(
            bot.id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(10_000),
        );

        ladder.evaluate(&bot, &config).unwrap();
        let victim = engine.open_orders(bot.account, &mk())[0].id;
        engine.cancel(victim);

        ladder.evaluate(&bot, &config).unwrap();

        // Back to a full ladder; the cancelled rung was re-posted.
        assert_eq!(engine.open_orders(bot.account, &mk()).len(), 3);
    }

    #[test]
    fn test_dry_queue_posts_nothing() {
        let (engine, _, ladder) = setup();
        let config = seeded_config();
        let bot = ladder_bot(&config);

        ladder.evaluate(&bot, &config).unwrap();

        assert!(engine.open_orders(bot.account, &mk()).is_empty());
    }

    #[test]
    fn test_reference_moves_off_seed_after_first_trade() {
        let (engine, inventory, ladder) = setup();
        let config = seeded_config();
        let bot = ladder_bot(&config);
        inventory.add_lot(
            bot.id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(10_000),
        );

        ladder.evaluate(&bot, &config).unwrap();
        buy(&engine, dec!(1.01), 1000);
        engine.cancel(
            engine.open_orders(bot.account, &mk())[0].id,
        );

        ladder.evaluate(&bot, &config).unwrap();

        // New rungs now price off the trade history, not the seed: the
        // spawned level 4 sits at 1.01 × 1.04.
        let prices = open_prices(&engine, &bot);
        assert_eq!(prices.len(), 3);
        assert_eq!(*prices.last().unwrap(), Price::new(dec!(1.01) * dec!(1.04)));
    }
}
