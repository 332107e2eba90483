//! Identifier newtypes.
//!
//! Every entity in the exchange carries a UUID-backed id. Wrapping them in
//! distinct types prevents mixing an order id with a trade id in calls that
//! take several ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn inner(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }
    };
}

uuid_id!(
    /// Order identifier.
    OrderId
);
uuid_id!(
    /// Trade identifier.
    TradeId
);
uuid_id!(
    /// Account identifier (human submitter or bot-as-proxy).
    AccountId
);
uuid_id!(
    /// Bot identifier.
    BotId
);
uuid_id!(
    /// Inventory lot identifier.
    LotId
);
uuid_id!(
    /// Upstream credit grant identifier (client mandate or house holding).
    SourceId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique() {
        assert_ne!(OrderId::new(), OrderId::new());
        assert_ne!(LotId::new(), LotId::new());
    }

    #[test]
    fn test_id_display_roundtrip() {
        let id = AccountId::new();
        let parsed: Uuid = id.to_string().parse().unwrap();
        assert_eq!(id.inner(), parsed);
    }
}
