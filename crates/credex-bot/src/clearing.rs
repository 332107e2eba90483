//! In-process clearing house.
//!
//! Stands in for the external balance oracle and ledger service so the
//! daemon runs self-contained. Asset references on orders are the owning
//! account id in string form; transfers against unknown references fail,
//! which exercises the settlement-pending path end to end.

use std::str::FromStr;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use credex_book::{BalanceOracle, LedgerError, LedgerService};
use credex_core::{AccountId, Credits, MarketKey};

/// Cash balances plus a minimal transfer log.
#[derive(Debug, Default)]
pub struct ClearingHouse {
    balances: DashMap<AccountId, Decimal>,
    transfers: DashMap<String, Credits>,
}

impl ClearingHouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with an opening cash balance.
    pub fn open_account(&self, account: AccountId, opening_balance: Decimal) {
        self.balances.insert(account, opening_balance);
    }

    pub fn balance(&self, account: AccountId) -> Decimal {
        self.balances
            .get(&account)
            .map(|b| *b)
            .unwrap_or(Decimal::ZERO)
    }

    /// Number of transfers executed so far.
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    fn resolve(&self, asset_ref: &str) -> Result<AccountId, LedgerError> {
        let uuid = Uuid::from_str(asset_ref)
            .map_err(|_| LedgerError::UnknownAccount(asset_ref.to_string()))?;
        let account = AccountId::from(uuid);
        if !self.balances.contains_key(&account) {
            return Err(LedgerError::UnknownAccount(asset_ref.to_string()));
        }
        Ok(account)
    }
}

impl BalanceOracle for ClearingHouse {
    fn available(&self, account: AccountId, _market: &MarketKey) -> Decimal {
        self.balance(account)
    }
}

impl LedgerService for ClearingHouse {
    fn transfer(
        &self,
        seller_ref: &str,
        buyer_ref: &str,
        market: &MarketKey,
        quantity: Credits,
    ) -> Result<String, LedgerError> {
        let seller = self.resolve(seller_ref)?;
        let buyer = self.resolve(buyer_ref)?;

        let reference = format!("stl-{}", Uuid::new_v4());
        self.transfers.insert(reference.clone(), quantity);
        debug!(
            %market,
            %seller,
            %buyer,
            %quantity,
            settlement_ref = %reference,
            "Credit transfer executed"
        );
        Ok(reference)
    }
}
