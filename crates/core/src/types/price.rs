//! Non-negative prices in minor currency units.
//!
//! Item prices are stored as whole integers (`items.price INTEGER`), the
//! same unit the catalog has always used: a price of `500` renders as `500`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative (got {0})")]
    Negative(i64),
}

/// An item price in integer minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount < 0`.
    pub const fn new(amount: i64) -> Result<Self, PriceError> {
        if amount < 0 {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Apply a percentage discount, rounding down. Discounts are clamped to `0..=100`.
    #[must_use]
    pub const fn discounted(self, percent: i64) -> Self {
        let percent = if percent < 0 {
            0
        } else if percent > 100 {
            100
        } else {
            percent
        };
        Self(self.0.saturating_mul(100 - percent) / 100)
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> <sqlx::Sqlite as sqlx::Database>::TypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &<sqlx::Sqlite as sqlx::Database>::TypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::new(-1), Err(PriceError::Negative(-1)));
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_serde_as_integer() {
        let price: Price = serde_json::from_str("500").unwrap();
        assert_eq!(price.amount(), 500);
        assert_eq!(serde_json::to_string(&price).unwrap(), "500");
    }

    #[test]
    fn test_discounted() {
        let price = Price::new(500).unwrap();
        assert_eq!(price.discounted(10).amount(), 450);
        assert_eq!(price.discounted(150).amount(), 0);
        assert_eq!(price.discounted(-3).amount(), 500);
    }
}
