//! Market identification types.
//!
//! A credit market is keyed by the catchment it belongs to and the unit type
//! traded in it. Orders from different market keys never interact.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit type of a fungible credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Nitrate,
    Phosphate,
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nitrate => write!(f, "nitrate"),
            Self::Phosphate => write!(f, "phosphate"),
        }
    }
}

impl std::str::FromStr for UnitType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nitrate" => Ok(Self::Nitrate),
            "phosphate" => Ok(Self::Phosphate),
            other => Err(CoreError::InvalidMarketKey(format!(
                "unknown unit type: {other}"
            ))),
        }
    }
}

/// Catchment identifier (e.g. "waikato", "manawatu").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catchment(String);

impl Catchment {
    /// Create a catchment id. Must be non-empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidMarketKey(
                "catchment must be non-empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Catchment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique market identifier combining catchment and unit type.
///
/// This is the primary key scoping an order book. Format: `{catchment}:{unit}`
/// (e.g. "waikato:nitrate").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub catchment: Catchment,
    pub unit: UnitType,
}

impl MarketKey {
    pub fn new(catchment: Catchment, unit: UnitType) -> Self {
        Self { catchment, unit }
    }

    /// Parse from the canonical `{catchment}:{unit}` form.
    pub fn parse(s: &str) -> Result<Self> {
        let (catchment, unit) = s
            .rsplit_once(':')
            .ok_or_else(|| CoreError::InvalidMarketKey(format!("missing ':' in {s:?}")))?;
        Ok(Self {
            catchment: Catchment::new(catchment)?,
            unit: unit.parse()?,
        })
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.catchment, self.unit)
    }
}
