//! Fixed-point money in smallest units.
//!
//! An [`Amount`] counts indivisible smallest units (10^18 per whole unit for
//! both the native currency and the token). All arithmetic is integer and
//! overflow-checked; conversions from human-readable [`Decimal`] units
//! truncate any fraction below one smallest unit (floor).

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OpenraiseError, Result, constants};

/// A non-negative value in smallest units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(smallest_units: u128) -> Self {
        Self(smallest_units)
    }

    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert whole units (e.g. `0.1`) into smallest units.
    ///
    /// Digits below the smallest unit are dropped.
    ///
    /// # Errors
    /// - `Configuration` for negative input
    /// - `ArithmeticOverflow` if the value does not fit
    pub fn from_units(units: Decimal) -> Result<Self> {
        if units.is_sign_negative() && !units.is_zero() {
            return Err(OpenraiseError::Configuration(format!(
                "amount must not be negative: {units}"
            )));
        }
        let mantissa = units.mantissa().unsigned_abs();
        let scale = units.scale();
        let value = if scale <= constants::UNIT_DECIMALS {
            mantissa
                .checked_mul(10u128.pow(constants::UNIT_DECIMALS - scale))
                .ok_or(OpenraiseError::ArithmeticOverflow)?
        } else {
            mantissa / 10u128.pow(scale - constants::UNIT_DECIMALS)
        };
        Ok(Self(value))
    }

    /// Whole-unit representation, for display and reporting.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the value exceeds `Decimal` precision.
    pub fn to_units(self) -> Result<Decimal> {
        let signed = i128::try_from(self.0).map_err(|_| OpenraiseError::ArithmeticOverflow)?;
        Decimal::try_from_i128_with_scale(signed, constants::UNIT_DECIMALS)
            .map(|d| d.normalize())
            .map_err(|_| OpenraiseError::ArithmeticOverflow)
    }

    /// # Errors
    /// Returns `ArithmeticOverflow` on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(OpenraiseError::ArithmeticOverflow)
    }

    /// # Errors
    /// Returns `InsufficientBalance` if `other > self`.
    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(OpenraiseError::InsufficientBalance {
                needed: other,
                available: self,
            })
    }

    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by an integer rate (tokens per smallest native unit).
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` on overflow.
    pub fn checked_mul_rate(self, rate: u64) -> Result<Self> {
        self.0
            .checked_mul(u128::from(rate))
            .map(Self)
            .ok_or(OpenraiseError::ArithmeticOverflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse whole units from a decimal string. Test fixture only.
#[cfg(any(test, feature = "test-helpers"))]
#[must_use]
pub fn units(value: &str) -> Amount {
    let parsed: Decimal = value.parse().expect("valid decimal literal");
    Amount::from_units(parsed).expect("amount in range")
}
