//! Periodic bot scheduler.
//!
//! A single long-lived driver invokes the injected tick handler on a fixed
//! interval. No hidden process-wide state: dependencies are injected and the
//! lifecycle is explicit start/stop.

pub mod scheduler;

pub use scheduler::{Scheduler, TickHandler};
