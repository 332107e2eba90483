//! FIFO queue over a bot's inventory lots.
//!
//! One lock per bot guards every mutation path: `add_lot` (assignment),
//! `settle` (matching engine, on a fill) and the read-side `take`. This
//! keeps `available + taken` invariant when fills land while a strategy
//! tick is drawing inventory.

use crate::error::{InventoryError, Result};
use crate::lot::{Lot, SourceKind};
use credex_core::{BotId, Credits, LotId, SourceId};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

/// Credits granted from a single lot by `take`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub lot: LotId,
    pub credits: Credits,
}

#[derive(Debug, Default)]
struct BotLots {
    /// Sorted by `position`; ties resolved by insertion order.
    lots: Vec<Lot>,
}

/// All bots' inventory queues.
#[derive(Debug, Default)]
pub struct InventoryBook {
    bots: DashMap<BotId, Mutex<BotLots>>,
}

impl InventoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new lot at the back of the bot's queue.
    pub fn add_lot(
        &self,
        bot: BotId,
        source: SourceId,
        source_kind: SourceKind,
        credits: Credits,
    ) -> LotId {
        let entry = self.bots.entry(bot).or_default();
        let mut lots = entry.lock();
        let position = lots
            .lots
            .iter()
            .map(|l| l.position)
            .max()
            .map_or(0, |p| p + 1);
        let lot = Lot::new(bot, source, source_kind, credits, position);
        let id = lot.id;
        debug!(%bot, lot = %id, %credits, ?source_kind, position, "Lot assigned");
        lots.lots.push(lot);
        id
    }

    /// Grant up to `requested` credits from the single oldest lot with
    /// availability. Never spans lots: a caller needing more calls again,
    /// which naturally advances FIFO order. Does not mutate the lot; the
    /// available→taken transfer happens at `settle`.
    pub fn take(&self, bot: BotId, requested: Credits) -> Option<Grant> {
        if requested.is_zero() {
            return None;
        }
        let entry = self.bots.get(&bot)?;
        let lots = entry.lock();
        lots.lots
            .iter()
            .filter(|l| !l.available.is_zero())
            .min_by_key(|l| l.position)
            .map(|l| Grant {
                lot: l.id,
                credits: requested.min(l.available),
            })
    }

    /// Move `amount` from available to taken on the given lot.
    pub fn settle(&self, bot: BotId, lot: LotId, amount: Credits) -> Result<()> {
        let entry = self
            .bots
            .get(&bot)
            .ok_or(InventoryError::UnknownBot(bot))?;
        let mut lots = entry.lock();
        let target = lots
            .lots
            .iter_mut()
            .find(|l| l.id == lot)
            .ok_or(InventoryError::UnknownLot(lot))?;
        target.settle(amount)?;
        debug!(%bot, lot = %lot, %amount, available = %target.available, "Lot settled");
        Ok(())
    }

    /// Sum of `available` across the bot's lots.
    pub fn total_available(&self, bot: BotId) -> Credits {
        self.fold(bot, |l| l.available)
    }

    /// Sum of `taken` across the bot's lots.
    pub fn total_taken(&self, bot: BotId) -> Credits {
        self.fold(bot, |l| l.taken)
    }

    /// Fraction of the bot's total assigned credits still unsold:
    /// `available / (available + taken)`. None when the bot holds no
    /// credits at all (callers treat that as neutral).
    pub fn ratio(&self, bot: BotId) -> Option<Decimal> {
        let entry = self.bots.get(&bot)?;
        let lots = entry.lock();
        let (available, total) = lots.lots.iter().fold(
            (Credits::ZERO, Credits::ZERO),
            |(a, t), l| (a + l.available, t + l.total()),
        );
        if total.is_zero() {
            return None;
        }
        Some(available.as_decimal() / total.as_decimal())
    }

    /// Snapshot of a single lot.
    pub fn lot(&self, bot: BotId, lot: LotId) -> Option<Lot> {
        let entry = self.bots.get(&bot)?;
        let lots = entry.lock();
        lots.lots.iter().find(|l| l.id == lot).cloned()
    }

    /// Snapshot of all of a bot's lots in FIFO order.
    pub fn lots(&self, bot: BotId) -> Vec<Lot> {
        self.bots
            .get(&bot)
            .map(|entry| {
                let lots = entry.lock();
                let mut out = lots.lots.clone();
                out.sort_by_key(|l| l.position);
                out
            })
            .unwrap_or_default()
    }

    fn fold(&self, bot: BotId, f: impl Fn(&Lot) -> Credits) -> Credits {
        self.bots
            .get(&bot)
            .map(|entry| {
                let lots = entry.lock();
                lots.lots
                    .iter()
                    .fold(Credits::ZERO, |acc, l| acc + f(l))
            })
            .unwrap_or(Credits::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seeded(credits: &[u64]) -> (InventoryBook, BotId, Vec<LotId>) {
        let book = InventoryBook::new();
        let bot = BotId::new();
        let ids = credits
            .iter()
            .map(|&c| book.add_lot(bot, SourceId::new(), SourceKind::Client, Credits::new(c)))
            .collect();
        (book, bot, ids)
    }

    #[test]
    fn test_take_grants_from_oldest_lot() {
        let (book, bot, ids) = seeded(&[10_000, 5000]);
        let grant = book.take(bot, Credits::new(4000)).unwrap();
        assert_eq!(grant.lot, ids[0]);
        assert_eq!(grant.credits, Credits::new(4000));

        book.settle(bot, grant.lot, grant.credits).unwrap();
        let lot = book.lot(bot, ids[0]).unwrap();
        assert_eq!(lot.available, Credits::new(6000));
        assert_eq!(lot.taken, Credits::new(4000));
    }

    #[test]
    fn test_take_never_spans_lots() {
        let (book, bot, ids) = seeded(&[300, 5000]);
        // First lot can only cover 300 of the 1000 requested.
        let grant = book.take(bot, Credits::new(1000)).unwrap();
        assert_eq!(grant.lot, ids[0]);
        assert_eq!(grant.credits, Credits::new(300));

        // Draining the first lot advances the queue to the second.
        book.settle(bot, ids[0], Credits::new(300)).unwrap();
        let grant = book.take(bot, Credits::new(1000)).unwrap();
        assert_eq!(grant.lot, ids[1]);
        assert_eq!(grant.credits, Credits::new(1000));
    }

    #[test]
    fn test_take_empty_queue() {
        let book = InventoryBook::new();
        assert!(book.take(BotId::new(), Credits::new(100)).is_none());

        let (book, bot, ids) = seeded(&[100]);
        book.settle(bot, ids[0], Credits::new(100)).unwrap();
        assert!(book.take(bot, Credits::new(1)).is_none());
    }

    #[test]
    fn test_totals() {
        let (book, bot, ids) = seeded(&[1000, 2000]);
        assert_eq!(book.total_available(bot), Credits::new(3000));
        assert_eq!(book.total_taken(bot), Credits::ZERO);

        book.settle(bot, ids[0], Credits::new(500)).unwrap();
        assert_eq!(book.total_available(bot), Credits::new(2500));
        assert_eq!(book.total_taken(bot), Credits::new(500));
    }

    #[test]
    fn test_ratio() {
        let (book, bot, ids) = seeded(&[1000]);
        assert_eq!(book.ratio(bot), Some(dec!(1)));

        book.settle(bot, ids[0], Credits::new(250)).unwrap();
        assert_eq!(book.ratio(bot), Some(dec!(0.75)));

        // No lots at all: callers substitute the neutral 0.5.
        assert_eq!(book.ratio(BotId::new()), None);
    }

    #[test]
    fn test_settle_unknown_lot() {
        let (book, bot, _) = seeded(&[100]);
        let err = book.settle(bot, LotId::new(), Credits::new(1)).unwrap_err();
        assert!(matches!(err, InventoryError::UnknownLot(_)));
    }

    #[test]
    fn test_monotonic_transfer() {
        // available never increases, taken never decreases, sum constant.
        let (book, bot, ids) = seeded(&[1000]);
        let mut last_available = Credits::new(1000);
        let mut last_taken = Credits::ZERO;
        for _ in 0..4 {
            book.settle(bot, ids[0], Credits::new(250)).unwrap();
            let lot = book.lot(bot, ids[0]).unwrap();
            assert!(lot.available <= last_available);
            assert!(lot.taken >= last_taken);
            assert_eq!(lot.total(), Credits::new(1000));
            last_available = lot.available;
            last_taken = lot.taken;
        }
        assert!(last_available.is_zero());
    }

    #[test]
    fn test_positions_append_only() {
        let (book, bot, _) = seeded(&[1, 2, 3]);
        let lots = book.lots(bot);
        let positions: Vec<u32> = lots.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
