//! Credex exchange daemon.
//!
//! Wires the matching engine, inventory queues, bot strategies and the
//! scheduler into a running process, with an in-process clearing house
//! standing in for the external balance oracle and ledger service.

pub mod app;
pub mod clearing;
pub mod config;
pub mod error;

pub use app::App;
pub use clearing::ClearingHouse;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
