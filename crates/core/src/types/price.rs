//! Item price.
//!
//! Prices are plain floating point amounts in the catalog's single currency.
//! The only rule is that a price is a finite number strictly greater than zero.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be greater than 0")]
    NotPositive,
    /// The amount is NaN or infinite.
    #[error("price must be a finite number")]
    NotFinite,
}

/// A positive, finite item price.
///
/// ```
/// use atelier_core::Price;
///
/// assert_eq!(Price::new(19.99).unwrap().get(), 19.99);
/// assert!(Price::new(0.0).is_err());
/// assert!(Price::new(-5.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Create a price, rejecting non-positive and non-finite amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotFinite` for NaN or infinity and
    /// `PriceError::NotPositive` for amounts `<= 0`.
    pub fn new(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if amount <= 0.0 {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Get the amount.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_price() {
        let price = Price::new(19.99).unwrap();
        assert!((price.get() - 19.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_smallest_positive_price() {
        assert!(Price::new(f64::MIN_POSITIVE).is_ok());
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(Price::new(0.0), Err(PriceError::NotPositive));
        assert_eq!(Price::new(-0.0), Err(PriceError::NotPositive));
        assert_eq!(Price::new(-1.5), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(Price::new(f64::NAN), Err(PriceError::NotFinite));
        assert_eq!(Price::new(f64::INFINITY), Err(PriceError::NotFinite));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::new(24.5).unwrap().to_string(), "24.50");
    }

    #[test]
    fn test_deserialize_validates() {
        let price: Price = serde_json::from_str("24.99").unwrap();
        assert!((price.get() - 24.99).abs() < f64::EPSILON);
        assert!(serde_json::from_str::<Price>("0").is_err());
        assert!(serde_json::from_str::<Price>("-3.0").is_err());
    }
}
