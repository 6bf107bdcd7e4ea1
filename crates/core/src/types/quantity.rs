//! Item quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a quantity is not strictly positive.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be at least {min}, got {got}", min = Quantity::MIN)]
pub struct QuantityError {
    /// The rejected value.
    pub got: i64,
}

/// How many of an item to buy. Always at least 1.
///
/// Zero and negative quantities are not representable; they are rejected at
/// the boundary rather than defaulted.
///
/// ```
/// use grocery_core::Quantity;
///
/// assert_eq!(Quantity::default().get(), 1);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Smallest valid quantity.
    pub const MIN: i32 = 1;

    /// Quantity used when the caller does not supply one.
    pub const DEFAULT: Self = Self(1);

    /// Validate a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] if `value` is below [`Quantity::MIN`] or
    /// does not fit in an `i32`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        i32::try_from(value)
            .ok()
            .filter(|v| *v >= Self::MIN)
            .map(Self)
            .ok_or(QuantityError { got: value })
    }

    /// Returns the quantity as an `i32`.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Quantity::new(0), Err(QuantityError { got: 0 }));
        assert_eq!(Quantity::new(-1), Err(QuantityError { got: -1 }));
        assert_eq!(Quantity::new(1).unwrap().get(), 1);
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(Quantity::new(i64::from(i32::MAX) + 1).is_err());
        assert_eq!(Quantity::new(i64::from(i32::MAX)).unwrap().get(), i32::MAX);
    }

    #[test]
    fn test_deserialize_validates() {
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.get(), 4);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-2").is_err());
    }

    #[test]
    fn test_error_message() {
        let err = Quantity::new(0).unwrap_err();
        assert_eq!(err.to_string(), "quantity must be at least 1, got 0");
    }
}
