//! Inventory lot: one FIFO-ordered credit grant available to a bot.

use crate::error::{InventoryError, Result};
use credex_core::{BotId, Credits, LotId, SourceId};
use serde::{Deserialize, Serialize};

/// Origin of a lot, tagged at creation rather than derived later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Credits assigned under a client mandate.
    Client,
    /// House-held credits.
    House,
}

/// A credit grant consumed front-to-back by its owning bot.
///
/// `available + taken` is constant after creation: credits only move from
/// available to taken, never back. Lots drain to zero, they are not deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub bot: BotId,
    pub source: SourceId,
    pub source_kind: SourceKind,
    pub available: Credits,
    pub taken: Credits,
    /// FIFO order within the bot; ties broken by creation order.
    pub position: u32,
}

impl Lot {
    pub fn new(
        bot: BotId,
        source: SourceId,
        source_kind: SourceKind,
        credits: Credits,
        position: u32,
    ) -> Self {
        Self {
            id: LotId::new(),
            bot,
            source,
            source_kind,
            available: credits,
            taken: Credits::ZERO,
            position,
        }
    }

    /// The constant grant size.
    pub fn total(&self) -> Credits {
        self.available + self.taken
    }

    /// Move `amount` from available to taken.
    pub fn settle(&mut self, amount: Credits) -> Result<()> {
        let remaining = self
            .available
            .checked_sub(amount)
            .ok_or(InventoryError::Overdraw {
                lot: self.id,
                requested: amount,
                available: self.available,
            })?;
        self.available = remaining;
        self.taken = self.taken + amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(credits: u64) -> Lot {
        Lot::new(
            BotId::new(),
            SourceId::new(),
            SourceKind::Client,
            Credits::new(credits),
            0,
        )
    }

    #[test]
    fn test_settle_moves_available_to_taken() {
        let mut l = lot(10_000);
        l.settle(Credits::new(4000)).unwrap();
        assert_eq!(l.available, Credits::new(6000));
        assert_eq!(l.taken, Credits::new(4000));
        assert_eq!(l.total(), Credits::new(10_000));
    }

    #[test]
    fn test_settle_overdraw() {
        let mut l = lot(100);
        let err = l.settle(Credits::new(101)).unwrap_err();
        assert!(matches!(err, InventoryError::Overdraw { .. }));
        // State untouched on failure.
        assert_eq!(l.available, Credits::new(100));
        assert_eq!(l.taken, Credits::ZERO);
    }

    #[test]
    fn test_drain_to_zero() {
        let mut l = lot(50);
        l.settle(Credits::new(50)).unwrap();
        assert!(l.available.is_zero());
        assert_eq!(l.total(), Credits::new(50));
    }
}
