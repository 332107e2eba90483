//! Pure matching walk.
//!
//! No I/O here: given the incoming order and the sorted opposite-side
//! candidates, produce the list of fills price-time priority dictates.
//! The execution step in `engine` may commit a prefix of this plan (the
//! affordability check can stop the walk mid-way).

use credex_core::{AccountId, Credits, Order, OrderId, OrderKind, Price, Side};

/// One planned fill against a resting maker order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillIntent {
    pub maker: OrderId,
    pub maker_account: AccountId,
    /// Execution price: the maker's price (the resting side is always LIMIT).
    pub price: Price,
    pub quantity: Credits,
}

/// Sort candidates best-first for the incoming side: an incoming BUY wants
/// the cheapest ask first, an incoming SELL the highest bid first; ties go
/// to the oldest order.
pub fn sort_candidates(incoming_side: Side, candidates: &mut [Order]) {
    match incoming_side {
        Side::Buy => candidates.sort_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then_with(|| a.created_at.cmp(&b.created_at))
        }),
        Side::Sell => candidates.sort_by(|a, b| {
            b.price
                .cmp(&a.price)
                .then_with(|| a.created_at.cmp(&b.created_at))
        }),
    }
}

/// Walk the sorted candidates and plan fills.
///
/// - Self-trade guard: a candidate from the incoming order's own account is
///   skipped, not matched.
/// - Price compatibility (incoming LIMIT only): the list is price-sorted, so
///   the first incompatible candidate ends the walk rather than being
///   skipped.
/// - Fill quantity is `min(incoming remaining, candidate remaining)`.
pub fn plan_fills(incoming: &Order, candidates: &[Order]) -> Vec<FillIntent> {
    let mut remaining = incoming.remaining();
    let mut fills = Vec::new();

    for candidate in candidates {
        if remaining.is_zero() {
            break;
        }
        if candidate.account == incoming.account {
            continue;
        }
        let maker_price = candidate
            .price
            .expect("resting orders are always LIMIT and carry a price");

        if incoming.kind == OrderKind::Limit {
            let own = incoming
                .price
                .expect("limit orders carry a price");
            let compatible = match incoming.side {
                Side::Buy => maker_price <= own,
                Side::Sell => maker_price >= own,
            };
            if !compatible {
                break;
            }
        }

        let quantity = remaining.min(candidate.remaining());
        if quantity.is_zero() {
            continue;
        }

        fills.push(FillIntent {
            maker: candidate.id,
            maker_account: candidate.account,
            price: maker_price,
            quantity,
        });
        remaining = remaining.saturating_sub(quantity);
    }

    fills
}
