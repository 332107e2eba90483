//! Matching engine: submit/cancel surface and fill execution.
//!
//! Within one market key, submissions and cancels serialize on that key's
//! mutex; different markets proceed in parallel. The balance oracle and
//! ledger service are injected, so the planning walk stays pure and the
//! engine is testable with mocks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use credex_core::{
    AccountId, MarketKey, Order, OrderId, OrderKind, OrderStatus, SettlementStatus, Side, Trade,
};
use credex_inventory::InventoryBook;
use credex_persistence::TradeJournal;
use credex_telemetry::metrics;

use crate::book::{MarketBook, MarketSnapshot};
use crate::error::{BookError, Result};
use crate::plan::{plan_fills, sort_candidates, FillIntent};
use crate::traits::{BalanceOracle, LedgerService, SettlementConfig, SettlementPolicy};

/// Result of a submission: the order's final state plus any trades.
#[derive(Debug, Clone)]
pub struct Submission {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Result of a cancel request. Cancelling a terminal order is a no-op,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyClosed,
    Unknown,
}

/// The matching engine. One resting book per market key.
pub struct MatchingEngine {
    books: DashMap<MarketKey, Arc<Mutex<MarketBook>>>,
    /// Order id → owning market, for cancel/status lookups.
    index: DashMap<OrderId, MarketKey>,
    oracle: Arc<dyn BalanceOracle>,
    ledger: Arc<dyn LedgerService>,
    inventory: Arc<InventoryBook>,
    settlement: SettlementConfig,
    journal: Option<Arc<Mutex<TradeJournal>>>,
}

impl MatchingEngine {
    pub fn new(
        oracle: Arc<dyn BalanceOracle>,
        ledger: Arc<dyn LedgerService>,
        inventory: Arc<InventoryBook>,
        settlement: SettlementConfig,
    ) -> Self {
        Self {
            books: DashMap::new(),
            index: DashMap::new(),
            oracle,
            ledger,
            inventory,
            settlement,
            journal: None,
        }
    }

    /// Attach a trade journal; every executed trade is appended to it.
    pub fn with_journal(mut self, journal: Arc<Mutex<TradeJournal>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Submit an order against its market's resting book.
    ///
    /// Fails with `InvalidOrder` before any book mutation. A MARKET order
    /// that matches nothing is cancelled and reported as `NoLiquidity`.
    pub fn submit(&self, mut order: Order) -> Result<Submission> {
        Self::validate(&order)?;

        let market = order.market.clone();
        let market_label = market.to_string();
        metrics::ORDERS_SUBMITTED_TOTAL
            .with_label_values(&[market_label.as_str(), &order.side.to_string()])
            .inc();
        let started = Instant::now();

        let book_arc = self.books.entry(market.clone()).or_default().clone();
        let mut book = book_arc.lock();

        let mut candidates = book.open_candidates(order.side.opposite(), order.id);
        sort_candidates(order.side, &mut candidates);
        let plan = plan_fills(&order, &candidates);

        let mut trades = Vec::with_capacity(plan.len());
        for intent in &plan {
            match self.execute_fill(&mut book, &mut order, intent)? {
                Some(trade) => trades.push(trade),
                // Walk stopped mid-plan; earlier fills stay committed.
                None => break,
            }
        }

        // No resting market orders: any remainder is forced CANCELLED.
        let market_unfilled =
            order.kind == OrderKind::Market && !order.remaining().is_zero();
        if market_unfilled {
            order.cancel();
        }

        self.index.insert(order.id, market.clone());
        book.insert(order.clone());
        self.update_gauges(&market_label, &book);

        metrics::MATCH_WALK_MS
            .with_label_values(&[market_label.as_str()])
            .observe(started.elapsed().as_secs_f64() * 1000.0);

        if market_unfilled && trades.is_empty() {
            debug!(order = %order.id, market = %market_label, "Market order found no liquidity");
            return Err(BookError::NoLiquidity(order.id));
        }

        info!(
            order = %order.id,
            market = %market_label,
            side = %order.side,
            status = %order.status,
            filled = %order.filled,
            trades = trades.len(),
            "Order submitted"
        );

        Ok(Submission { order, trades })
    }

    /// Cancel an order. Terminal and idempotent: a second cancel (or a
    /// cancel of a filled order) reports `AlreadyClosed` without error.
    pub fn cancel(&self, id: OrderId) -> CancelOutcome {
        let market = match self.index.get(&id) {
            Some(entry) => entry.value().clone(),
            None => return CancelOutcome::Unknown,
        };
        let book_arc = match self.books.get(&market) {
            Some(entry) => entry.value().clone(),
            None => return CancelOutcome::Unknown,
        };
        let mut book = book_arc.lock();
        match book.order_mut(id) {
            None => CancelOutcome::Unknown,
            Some(order) => {
                if order.cancel() {
                    debug!(order = %id, market = %market, "Order cancelled");
                    let label = market.to_string();
                    self.update_gauges(&label, &book);
                    CancelOutcome::Cancelled
                } else {
                    CancelOutcome::AlreadyClosed
                }
            }
        }
    }

    /// Current state of an order.
    pub fn order(&self, id: OrderId) -> Option<Order> {
        let market = self.index.get(&id)?.value().clone();
        let book_arc = self.books.get(&market)?.value().clone();
        let book = book_arc.lock();
        book.order(id).cloned()
    }

    /// All open orders an account has resting in a market.
    pub fn open_orders(&self, account: AccountId, market: &MarketKey) -> Vec<Order> {
        match self.books.get(market) {
            Some(entry) => {
                let book_arc = entry.value().clone();
                drop(entry);
                let book = book_arc.lock();
                book.open_orders_for(account)
            }
            None => Vec::new(),
        }
    }

    /// Read-only market state for strategies.
    pub fn snapshot(&self, market: &MarketKey) -> MarketSnapshot {
        match self.books.get(market) {
            Some(entry) => {
                let book_arc = entry.value().clone();
                drop(entry);
                let book = book_arc.lock();
                book.snapshot()
            }
            None => MarketSnapshot::default(),
        }
    }

    fn validate(order: &Order) -> Result<()> {
        if order.quantity.is_zero() {
            return Err(BookError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        match (order.kind, order.price) {
            (OrderKind::Limit, None) => {
                return Err(BookError::InvalidOrder(
                    "limit order requires a price".to_string(),
                ));
            }
            (OrderKind::Limit, Some(p)) if !p.is_positive() => {
                return Err(BookError::InvalidOrder(format!(
                    "limit price must be positive, got {p}"
                )));
            }
            (OrderKind::Market, Some(_)) => {
                return Err(BookError::InvalidOrder(
                    "market order must not carry a price".to_string(),
                ));
            }
            _ => {}
        }
        if order.status != OrderStatus::Pending || !order.filled.is_zero() {
            return Err(BookError::InvalidOrder(format!(
                "order {} was already processed",
                order.id
            )));
        }
        Ok(())
    }

    /// Execute one planned fill. Returns `Ok(None)` when the walk must stop
    /// at this fill (buyer cannot afford it, or settlement is blocking).
    fn execute_fill(
        &self,
        book: &mut MarketBook,
        incoming: &mut Order,
        intent: &FillIntent,
    ) -> Result<Option<Trade>> {
        let market = incoming.market.clone();
        let market_label = market.to_string();
        let cost = intent.price.notional(intent.quantity);

        let (buyer_account, seller_account) = match incoming.side {
            Side::Buy => (incoming.account, intent.maker_account),
            Side::Sell => (intent.maker_account, incoming.account),
        };

        // Affordability check on the buyer of this fill. Stopping the whole
        // walk keeps a buyer who cannot afford the best price from silently
        // being offered a worse one.
        let available = self.oracle.available(buyer_account, &market);
        if available < cost {
            warn!(
                market = %market_label,
                buyer = %buyer_account,
                %cost,
                %available,
                "Insufficient balance, stopping match walk"
            );
            return Ok(None);
        }

        let (seller_ref, buyer_ref, seller_funding) = {
            let maker = book
                .order(intent.maker)
                .expect("planned maker exists in book");
            match incoming.side {
                Side::Buy => (
                    maker.asset_ref.clone(),
                    incoming.asset_ref.clone(),
                    maker.funding,
                ),
                Side::Sell => (
                    incoming.asset_ref.clone(),
                    maker.asset_ref.clone(),
                    incoming.funding,
                ),
            }
        };

        let settlement =
            match self.transfer_with_retry(&seller_ref, &buyer_ref, &market, intent) {
                Ok(reference) => SettlementStatus::Settled(reference),
                Err(e) => {
                    metrics::SETTLEMENT_FAILURES_TOTAL
                        .with_label_values(&[market_label.as_str()])
                        .inc();
                    match self.settlement.policy {
                        SettlementPolicy::RecordPending => {
                            warn!(
                                market = %market_label,
                                error = %e,
                                "Ledger transfer failed, recording trade as settlement-pending"
                            );
                            SettlementStatus::Pending
                        }
                        SettlementPolicy::Block => {
                            error!(
                                market = %market_label,
                                error = %e,
                                "Ledger transfer failed, blocking fill"
                            );
                            return Ok(None);
                        }
                    }
                }
            };

        // Commit the fill to both orders.
        incoming.apply_fill(intent.quantity)?;
        book.order_mut(intent.maker)
            .expect("planned maker exists in book")
            .apply_fill(intent.quantity)?;

        // Debit the funding lot when the seller side is bot-owned.
        if let Some(funding) = seller_funding {
            if let Err(e) = self.inventory.settle(funding.bot, funding.lot, intent.quantity) {
                // take/settle paired correctly never hit this; matching
                // carries on, the queue is reconciled out of band.
                error!(
                    market = %market_label,
                    bot = %funding.bot,
                    lot = %funding.lot,
                    error = %e,
                    "Inventory settle failed"
                );
            }
        }

        let trade = Trade::new(
            buyer_account,
            seller_account,
            market,
            intent.quantity,
            intent.price,
            settlement,
        );
        debug!(
            trade = %trade.id,
            market = %market_label,
            quantity = %trade.quantity,
            price = %trade.price,
            settled = trade.settlement.is_settled(),
            "Trade executed"
        );

        book.record_trade(trade.clone());
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.lock().record_trade(&trade) {
                warn!(error = %e, "Failed to journal trade");
            }
        }
        metrics::TRADES_TOTAL.with_label_values(&[market_label.as_str()]).inc();
        metrics::TRADE_CREDITS_TOTAL
            .with_label_values(&[market_label.as_str()])
            .inc_by(intent.quantity.inner() as f64);

        Ok(Some(trade))
    }

    fn transfer_with_retry(
        &self,
        seller_ref: &str,
        buyer_ref: &str,
        market: &MarketKey,
        intent: &FillIntent,
    ) -> std::result::Result<String, crate::traits::LedgerError> {
        let attempts = self.settlement.retry_attempts.max(1);
        let mut last_err = None;
        for attempt in 0..attempts {
            if attempt > 0 {
                std::thread::sleep(Duration::from_millis(
                    self.settlement.retry_backoff_ms * attempt as u64,
                ));
            }
            match self
                .ledger
                .transfer(seller_ref, buyer_ref, market, intent.quantity)
            {
                Ok(reference) => return Ok(reference),
                Err(e) => {
                    warn!(
                        %market,
                        attempt = attempt + 1,
                        attempts,
                        error = %e,
                        "Ledger transfer attempt failed"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.expect("at least one transfer attempt was made"))
    }

    fn update_gauges(&self, market_label: &str, book: &MarketBook) {
        metrics::RESTING_ORDERS
            .with_label_values(&[market_label, "buy"])
            .set(book.open_count(Side::Buy) as f64);
        metrics::RESTING_ORDERS
            .with_label_values(&[market_label, "sell"])
            .set(book.open_count(Side::Sell) as f64);
    }
}
