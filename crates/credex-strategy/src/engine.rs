//! Bot registry and tick driver.
//!
//! The scheduler calls `run_tick`, which evaluates every active bot
//! sequentially. A failing bot is logged and counted; it never aborts the
//! processing of other bots in the same tick.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use credex_book::MatchingEngine;
use credex_core::{BotId, Credits, LotId, SourceId};
use credex_inventory::{InventoryBook, SourceKind};
use credex_sched::TickHandler;
use credex_telemetry::metrics;

use crate::bot::Bot;
use crate::config::StrategyConfig;
use crate::ladder::LadderStrategy;
use crate::maker::MakerStrategy;

/// Owns the bots and dispatches each tick to the right strategy.
pub struct StrategyEngine {
    engine: Arc<MatchingEngine>,
    inventory: Arc<InventoryBook>,
    maker: MakerStrategy,
    ladder: LadderStrategy,
    bots: Mutex<Vec<Bot>>,
}

impl StrategyEngine {
    pub fn new(engine: Arc<MatchingEngine>, inventory: Arc<InventoryBook>) -> Self {
        Self {
            maker: MakerStrategy::new(engine.clone(), inventory.clone()),
            ladder: LadderStrategy::new(engine.clone(), inventory.clone()),
            engine,
            inventory,
            bots: Mutex::new(Vec::new()),
        }
    }

    /// Register a bot (already validated by `Bot::new`).
    pub fn register(&self, bot: Bot) -> BotId {
        let id = bot.id;
        info!(bot = %id, market = %bot.market, kind = bot.strategy_kind(), "Bot registered");
        self.bots.lock().push(bot);
        id
    }

    /// Assign an upstream credit grant to a bot's inventory queue.
    /// Returns None for an unknown bot.
    pub fn assign_lot(
        &self,
        bot: BotId,
        source: SourceId,
        source_kind: SourceKind,
        credits: Credits,
    ) -> Option<LotId> {
        let bots = self.bots.lock();
        if !bots.iter().any(|b| b.id == bot) {
            warn!(%bot, "Lot assignment to unknown bot ignored");
            return None;
        }
        Some(self.inventory.add_lot(bot, source, source_kind, credits))
    }

    /// Activate or deactivate a bot. Deactivation cancels its resting
    /// orders. Returns false for an unknown bot.
    pub fn set_active(&self, id: BotId, active: bool) -> bool {
        let mut bots = self.bots.lock();
        let Some(bot) = bots.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        bot.is_active = active;
        if !active {
            let account = bot.account;
            let market = bot.market.clone();
            drop(bots);
            for order in self.engine.open_orders(account, &market) {
                self.engine.cancel(order.id);
            }
            info!(bot = %id, "Bot deactivated, resting orders cancelled");
        }
        true
    }

    /// Snapshot of all registered bots.
    pub fn bots(&self) -> Vec<Bot> {
        self.bots.lock().clone()
    }
}

impl TickHandler for StrategyEngine {
    fn run_tick(&self) {
        let bots: Vec<Bot> = self
            .bots
            .lock()
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect();

        for bot in bots {
            let kind = bot.strategy_kind();
            metrics::BOT_EVALUATIONS_TOTAL
                .with_label_values(&[kind])
                .inc();

            let result = match &bot.strategy {
                StrategyConfig::MarketMaker(config) => self.maker.evaluate(&bot, config),
                StrategyConfig::SellLadder(config) => self.ladder.evaluate(&bot, config),
            };

            if let Err(e) = result {
                metrics::BOT_EVAL_ERRORS_TOTAL
                    .with_label_values(&[kind])
                    .inc();
                error!(bot = %bot.id, market = %bot.market, error = %e, "Bot evaluation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LadderConfig, MakerConfig};
    use credex_book::{BalanceOracle, LedgerError, LedgerService, SettlementConfig};
    use credex_core::{AccountId, Catchment, MarketKey, Price, UnitType};
    use rust_decimal::Decimal;
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

    fn mk(catchment: &str) -> MarketKey {
        MarketKey::new(Catchment::new(catchment).unwrap(), UnitType::Nitrate)
    }

    fn setup() -> (Arc<MatchingEngine>, StrategyEngine) {
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
        let strategies = StrategyEngine::new(engine.clone(), inventory);
        (engine, strategies)
    }

    #[test]
    fn test_tick_drives_all_active_bots() {
        let (engine, strategies) = setup();

        let maker = Bot::new(
            AccountId::new(),
            mk("waikato"),
            StrategyConfig::MarketMaker(MakerConfig::default()),
        )
        .unwrap();
        let ladder = Bot::new(
            AccountId::new(),
            mk("manawatu"),
            StrategyConfig::SellLadder(LadderConfig {
                starting_price: Some(Price::new(dec!(1.00))),
                ..Default::default()
            }),
        )
        .unwrap();

        let maker_account = maker.account;
        let ladder_account = ladder.account;
        let maker_id = strategies.register(maker);
        let ladder_id = strategies.register(ladder);

        strategies.assign_lot(
            maker_id,
            SourceId::new(),
            SourceKind::House,
            Credits::new(10_000),
        );
        strategies.assign_lot(
            ladder_id,
            SourceId::new(),
            SourceKind::Client,
            Credits::new(10_000),
        );

        strategies.run_tick();

        assert_eq!(engine.open_orders(maker_account, &mk("waikato")).len(), 2);
        assert_eq!(engine.open_orders(ladder_account, &mk("manawatu")).len(), 3);
    }

    #[test]
    fn test_inactive_bot_skipped() {
        let (engine, strategies) = setup();

        let bot = Bot::new(
            AccountId::new(),
            mk("waikato"),
            StrategyConfig::MarketMaker(MakerConfig::default()),
        )
        .unwrap();
        let account = bot.account;
        let id = strategies.register(bot);
        strategies.assign_lot(id, SourceId::new(), SourceKind::House, Credits::new(10_000));
        strategies.set_active(id, false);

        strategies.run_tick();

        assert!(engine.open_orders(account, &mk("waikato")).is_empty());
    }

    #[test]
    fn test_deactivation_cancels_resting_orders() {
        let (engine, strategies) = setup();

        let bot = Bot::new(
            AccountId::new(),
            mk("waikato"),
            StrategyConfig::MarketMaker(MakerConfig::default()),
        )
        .unwrap();
        let account = bot.account;
        let id = strategies.register(bot);
        strategies.assign_lot(id, SourceId::new(), SourceKind::House, Credits::new(10_000));

        strategies.run_tick();
        assert_eq!(engine.open_orders(account, &mk("waikato")).len(), 2);

        assert!(strategies.set_active(id, false));
        assert!(engine.open_orders(account, &mk("waikato")).is_empty());
    }

    #[test]
    fn test_assign_lot_unknown_bot() {
        let (_, strategies) = setup();
        assert!(strategies
            .assign_lot(
                BotId::new(),
                SourceId::new(),
                SourceKind::House,
                Credits::new(100)
            )
            .is_none());
    }
}
