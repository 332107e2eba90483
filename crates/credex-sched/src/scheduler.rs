//! Tick loop driving bot strategy evaluation.
//!
//! Start is idempotent; stop is graceful and waits for an in-flight tick to
//! complete before returning. The handler runs on the blocking pool because
//! strategy evaluation is synchronous (it calls the matching engine, which
//! calls the ledger in-line).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use credex_telemetry::metrics;

/// One scheduler tick's worth of work.
pub trait TickHandler: Send + Sync + 'static {
    fn run_tick(&self);
}

/// Periodic driver for bot evaluation.
pub struct Scheduler {
    interval: Duration,
    handler: Arc<dyn TickHandler>,
    cancel: Mutex<Option<CancellationToken>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(interval: Duration, handler: Arc<dyn TickHandler>) -> Self {
        Self {
            interval,
            handler,
            cancel: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the tick loop. Calling start on a running scheduler is a no-op.
    pub fn start(&self) {
        let mut cancel_guard = self.cancel.lock();
        if cancel_guard.is_some() {
            debug!("Scheduler already running, start ignored");
            return;
        }

        let token = CancellationToken::new();
        *cancel_guard = Some(token.clone());

        let interval = self.interval;
        let handler = self.handler.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // The tick itself is never raced against
                        // cancellation: once started it runs to completion.
                        let handler = handler.clone();
                        match tokio::task::spawn_blocking(move || handler.run_tick()).await {
                            Ok(()) => metrics::SCHEDULER_TICKS_TOTAL.inc(),
                            Err(e) => error!(?e, "Scheduler tick panicked"),
                        }
                    }
                }
            }
            debug!("Scheduler loop exited");
        });

        *self.handle.lock() = Some(handle);
        info!(interval_secs = self.interval.as_secs_f64(), "Scheduler started");
    }

    /// Whether the tick loop is currently running.
    pub fn is_running(&self) -> bool {
        self.cancel.lock().is_some()
    }

    /// Stop the tick loop, waiting for an in-flight tick to finish.
    /// Stopping a stopped scheduler is a no-op.
    pub async fn stop(&self) {
        let token = match self.cancel.lock().take() {
            Some(token) => token,
            None => {
                debug!("Scheduler not running, stop ignored");
                return;
            }
        };
        token.cancel();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(?e, "Scheduler task join failed");
            }
        }
        info!("Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        ticks: AtomicUsize,
    }

    impl CountingHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ticks: AtomicUsize::new(0),
            })
        }
    }

    impl TickHandler for CountingHandler {
        fn run_tick(&self) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct SlowHandler {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl TickHandler for SlowHandler {
        fn run_tick(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_ticks_fire() {
        let handler = CountingHandler::new();
        let scheduler = Scheduler::new(Duration::from_millis(10), handler.clone());

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;

        assert!(handler.ticks.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_no_ticks_after_stop() {
        let handler = CountingHandler::new();
        let scheduler = Scheduler::new(Duration::from_millis(10), handler.clone());

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop().await;

        let after_stop = handler.ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.ticks.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_start_idempotent() {
        let handler = CountingHandler::new();
        let scheduler = Scheduler::new(Duration::from_millis(10), handler.clone());

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_stop_idempotent() {
        let handler = CountingHandler::new();
        let scheduler = Scheduler::new(Duration::from_millis(10), handler);

        scheduler.start();
        scheduler.stop().await;
        // Second stop must not hang or panic.
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_stop_waits_for_inflight_tick() {
        let handler = Arc::new(SlowHandler {
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        });
        let scheduler = Scheduler::new(Duration::from_millis(5), handler.clone());

        scheduler.start();
        // Let the first (immediate) tick begin.
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.stop().await;

        // Every started tick ran to completion before stop returned.
        assert_eq!(
            handler.started.load(Ordering::SeqCst),
            handler.finished.load(Ordering::SeqCst)
        );
        assert!(handler.started.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let handler = CountingHandler::new();
        let scheduler = Scheduler::new(Duration::from_millis(10), handler.clone());

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.stop().await;

        let before = handler.ticks.load(Ordering::SeqCst);
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.stop().await;

        assert!(handler.ticks.load(Ordering::SeqCst) > before);
    }
}
