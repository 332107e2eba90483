//! JSON Lines journal for executed trades.
//!
//! Append mode with daily file rotation. Each line is independent, so a
//! crash mid-write loses at most one record.

use crate::error::PersistenceResult;
use chrono::Utc;
use credex_core::Trade;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use tracing::{debug, info, warn};

/// Flat trade row for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp_ms: i64,
    pub trade_id: String,
    pub market_key: String,
    pub buyer: String,
    pub seller: String,
    pub quantity: u64,
    pub price: String,
    pub total: String,
    pub settlement_ref: Option<String>,
    pub settled: bool,
}

impl TradeRecord {
    pub fn from_trade(trade: &Trade) -> Self {
        Self {
            timestamp_ms: trade.created_at.timestamp_millis(),
            trade_id: trade.id.to_string(),
            market_key: trade.market.to_string(),
            buyer: trade.buyer.to_string(),
            seller: trade.seller.to_string(),
            quantity: trade.quantity.inner(),
            price: trade.price.to_string(),
            total: trade.total.to_string(),
            settlement_ref: trade.settlement.reference().map(str::to_string),
            settled: trade.settlement.is_settled(),
        }
    }
}

/// Active writer state for the daily file.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// JSON Lines writer for trade records.
pub struct TradeJournal {
    /// Base directory for output files.
    base_dir: String,
    /// Buffer of pending records.
    buffer: Vec<TradeRecord>,
    /// Maximum buffer size before flush.
    max_buffer_size: usize,
    /// Active writer (open until date rotation).
    active_writer: Option<ActiveWriter>,
}

impl TradeJournal {
    /// Create a new trade journal.
    pub fn new(base_dir: &str, max_buffer_size: usize) -> Self {
        if let Err(e) = std::fs::create_dir_all(base_dir) {
            warn!(?e, "Failed to create directory: {}", base_dir);
        }

        Self {
            base_dir: base_dir.to_string(),
            buffer: Vec::with_capacity(max_buffer_size),
            max_buffer_size,
            active_writer: None,
        }
    }

    /// Add a trade record to the buffer.
    pub fn record(&mut self, record: TradeRecord) -> PersistenceResult<()> {
        self.buffer.push(record);

        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Convenience: record a domain trade.
    pub fn record_trade(&mut self, trade: &Trade) -> PersistenceResult<()> {
        self.record(TradeRecord::from_trade(trade))
    }

    fn close_active_writer(&mut self) -> PersistenceResult<()> {
        if let Some(mut active) = self.active_writer.take() {
            if let Err(e) = active.writer.flush() {
                warn!(?e, "Failed to flush journal on close");
            }
            info!(
                date = %active.date,
                records = active.records_written,
                "Closed trade journal file"
            );
        }
        Ok(())
    }

    fn create_new_writer(&mut self, date: &str) -> PersistenceResult<()> {
        let filename = format!("{}/trades_{}.jsonl", self.base_dir, date);

        info!(filename = %filename, "Opening trade journal (append mode)");

        // Append mode - won't truncate existing data
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        self.active_writer = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });

        Ok(())
    }

    /// Flush buffered records to the daily file.
    pub fn flush(&mut self) -> PersistenceResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();

        let needs_rotation = self
            .active_writer
            .as_ref()
            .map(|w| w.date != today)
            .unwrap_or(false);

        if needs_rotation {
            self.close_active_writer()?;
        }

        if self.active_writer.is_none() {
            self.create_new_writer(&today)?;
        }

        let record_count = self.buffer.len();

        {
            let active = self
                .active_writer
                .as_mut()
                .expect("active_writer should exist");

            for record in &self.buffer {
                let json = serde_json::to_string(record)?;
                writeln!(active.writer, "{}", json)?;
            }

            active.writer.flush()?;
            active.records_written += record_count;
        }

        debug!(
            date = %today,
            records = record_count,
            "Flushed trades to journal"
        );

        self.buffer.clear();

        Ok(())
    }

    /// Close the journal, flushing any pending data.
    pub fn close(&mut self) -> PersistenceResult<()> {
        self.flush()?;
        self.close_active_writer()
    }
}

impl Drop for TradeJournal {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, "Failed to flush journal buffer on drop");
        }
        if let Err(e) = self.close_active_writer() {
            warn!(?e, "Failed to close journal on drop");
        }
    }
}
