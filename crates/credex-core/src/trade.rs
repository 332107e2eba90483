//! Trade entity.
//!
//! Trades are created only by the matching engine as the side effect of a
//! match, and are immutable once created.

use crate::ids::{AccountId, TradeId};
use crate::market::MarketKey;
use crate::numeric::{Credits, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement outcome of a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reference")]
pub enum SettlementStatus {
    /// Ledger transfer completed; carries the settlement reference.
    Settled(String),
    /// Ledger transfer has not (yet) succeeded.
    Pending,
}

impl SettlementStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Settled(r) => Some(r),
            Self::Pending => None,
        }
    }
}

/// An executed match between a buyer and a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub market: MarketKey,
    pub quantity: Credits,
    pub price: Price,
    /// `quantity × price`, fixed at creation.
    pub total: Decimal,
    pub settlement: SettlementStatus,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        buyer: AccountId,
        seller: AccountId,
        market: MarketKey,
        quantity: Credits,
        price: Price,
        settlement: SettlementStatus,
    ) -> Self {
        Self {
            id: TradeId::new(),
            buyer,
            seller,
            market,
            quantity,
            total: price.notional(quantity),
            price,
            settlement,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Catchment, UnitType};
    use rust_decimal_macros::dec;

    fn mk() -> MarketKey {
        MarketKey::new(Catchment::new("waikato").unwrap(), UnitType::Phosphate)
    }

    #[test]
    fn test_total_is_quantity_times_price() {
        let trade = Trade::new(
            AccountId::new(),
            AccountId::new(),
            mk(),
            Credits::new(300),
            Price::new(dec!(2.10)),
            SettlementStatus::Pending,
        );
        assert_eq!(trade.total, dec!(630.00));
    }

    #[test]
    fn test_settlement_reference() {
        let settled = SettlementStatus::Settled("txn-42".to_string());
        assert!(settled.is_settled());
        assert_eq!(settled.reference(), Some("txn-42"));
        assert_eq!(SettlementStatus::Pending.reference(), None);
    }
}
