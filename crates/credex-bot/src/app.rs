//! Application wiring and lifecycle.
//!
//! Builds the component graph from configuration, runs the scheduler until
//! a shutdown signal arrives, then stops gracefully and closes the journal.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use credex_book::MatchingEngine;
use credex_core::{AccountId, Credits, MarketKey, SourceId};
use credex_inventory::InventoryBook;
use credex_persistence::TradeJournal;
use credex_sched::Scheduler;
use credex_strategy::{Bot, StrategyEngine};

use crate::clearing::ClearingHouse;
use crate::config::AppConfig;
use crate::error::AppResult;

/// The assembled daemon.
pub struct App {
    clearing: Arc<ClearingHouse>,
    engine: Arc<MatchingEngine>,
    strategies: Arc<StrategyEngine>,
    scheduler: Scheduler,
    journal: Arc<Mutex<TradeJournal>>,
}

impl App {
    /// Build the component graph from a validated configuration.
    pub fn build(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let clearing = Arc::new(ClearingHouse::new());
        let inventory = Arc::new(InventoryBook::new());
        let journal = Arc::new(Mutex::new(TradeJournal::new(
            &config.persistence.data_dir,
            config.persistence.buffer_size,
        )));

        let engine = Arc::new(
            MatchingEngine::new(
                clearing.clone(),
                clearing.clone(),
                inventory.clone(),
                config.settlement.clone(),
            )
            .with_journal(journal.clone()),
        );
        let strategies = Arc::new(StrategyEngine::new(engine.clone(), inventory.clone()));

        for bot_config in &config.bots {
            let account = AccountId::new();
            clearing.open_account(account, bot_config.opening_balance);

            let market = MarketKey::parse(&bot_config.market)?;
            let bot = Bot::new(account, market, bot_config.strategy.clone())?;
            let bot_id = strategies.register(bot);

            for lot in &bot_config.lots {
                strategies.assign_lot(
                    bot_id,
                    SourceId::new(),
                    lot.source_kind,
                    Credits::new(lot.credits),
                );
            }
            info!(
                name = %bot_config.name,
                bot = %bot_id,
                market = %bot_config.market,
                lots = bot_config.lots.len(),
                "Bot configured"
            );
        }

        let scheduler = Scheduler::new(
            Duration::from_secs(config.tick_interval_secs),
            strategies.clone(),
        );

        Ok(Self {
            clearing,
            engine,
            strategies,
            scheduler,
            journal,
        })
    }

    /// Run until ctrl-c, then shut down gracefully.
    pub async fn run(self) -> AppResult<()> {
        self.scheduler.start();
        info!("credex daemon running, ctrl-c to stop");

        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");

        self.scheduler.stop().await;
        self.journal.lock().close()?;
        info!("Shutdown complete");
        Ok(())
    }

    pub fn engine(&self) -> &Arc<MatchingEngine> {
        &self.engine
    }

    pub fn strategies(&self) -> &Arc<StrategyEngine> {
        &self.strategies
    }

    pub fn clearing(&self) -> &Arc<ClearingHouse> {
        &self.clearing
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
