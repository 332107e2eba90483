//! Prometheus metrics for the credex exchange.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, register_int_counter,
    CounterVec, GaugeVec, HistogramVec, IntCounter,
};

/// Orders submitted to the matching engine.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "credex_orders_submitted_total",
        "Total orders submitted to the matching engine",
        &["market_key", "side"]
    )
    .unwrap()
});

/// Trades produced by the matching engine.
pub static TRADES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "credex_trades_total",
        "Total trades executed",
        &["market_key"]
    )
    .unwrap()
});

/// Credits traded.
pub static TRADE_CREDITS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "credex_trade_credits_total",
        "Total credits traded",
        &["market_key"]
    )
    .unwrap()
});

/// Matching walk duration in milliseconds.
pub static MATCH_WALK_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "credex_match_walk_ms",
        "Matching walk duration in milliseconds",
        &["market_key"],
        vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]
    )
    .unwrap()
});

/// Ledger transfers that exhausted their retries.
pub static SETTLEMENT_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "credex_settlement_failures_total",
        "Total ledger transfers that exhausted retries",
        &["market_key"]
    )
    .unwrap()
});

/// Resting open orders per market and side.
pub static RESTING_ORDERS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "credex_resting_orders",
        "Open orders resting on the book",
        &["market_key", "side"]
    )
    .unwrap()
});

/// Bot evaluations performed.
pub static BOT_EVALUATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "credex_bot_evaluations_total",
        "Total bot strategy evaluations",
        &["strategy"]
    )
    .unwrap()
});

/// Bot evaluations that returned an error.
pub static BOT_EVAL_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "credex_bot_eval_errors_total",
        "Total bot strategy evaluations that failed",
        &["strategy"]
    )
    .unwrap()
});

/// Scheduler ticks completed.
pub static SCHEDULER_TICKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "credex_scheduler_ticks_total",
        "Total scheduler ticks completed"
    )
    .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        // Touching each Lazy twice must not re-register (would panic).
        for _ in 0..2 {
            ORDERS_SUBMITTED_TOTAL
                .with_label_values(&["waikato:nitrate", "buy"])
                .inc();
            TRADES_TOTAL.with_label_values(&["waikato:nitrate"]).inc();
            SCHEDULER_TICKS_TOTAL.inc();
        }
        assert!(SCHEDULER_TICKS_TOTAL.get() >= 2);
    }
}
