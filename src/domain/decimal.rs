//! Exact decimal numeric type backed by bigdecimal.
//!
//! Raw on-chain integers are `U256`; everything written to an aggregate is a
//! `Decimal` obtained by shifting the decimal point, never by floating point.

use alloy_primitives::U256;
use bigdecimal::num_bigint::{BigInt, BigUint, Sign};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scale used for fee values expressed in basis points of 1e5.
pub const FEE_DECIMALS: u8 = 5;

/// Lossless decimal numeric type for token accounting.
///
/// Serializes to a plain decimal string so that values wider than any
/// float survive JSON unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Decimal(BigDecimal);

impl Decimal {
    /// Create a Decimal from a BigDecimal.
    pub fn new(value: BigDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, bigdecimal::ParseBigDecimalError> {
        BigDecimal::from_str(s).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent, no trailing zeros).
    pub fn to_canonical_string(&self) -> String {
        self.0.normalized().to_plain_string()
    }

    /// Get the underlying BigDecimal.
    pub fn inner(&self) -> &BigDecimal {
        &self.0
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(BigDecimal::zero())
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Convert a raw integer amount into its decimal value `raw / 10^places`.
///
/// Zero short-circuits to an exact zero without touching the scale.
pub fn to_decimal(raw: U256, places: u8) -> Decimal {
    if raw.is_zero() {
        return Decimal::zero();
    }
    Decimal(BigDecimal::new(u256_to_big_int(raw), i64::from(places)))
}

/// Scale a decimal back into a raw integer amount (`value * 10^places`).
///
/// Returns `None` when the scaled value is negative, fractional, or wider
/// than 256 bits.
pub fn from_decimal(value: &Decimal, places: u8) -> Option<U256> {
    let (digits, scale) = value.0.as_bigint_and_exponent();
    if digits.sign() == Sign::Minus {
        return None;
    }

    let shift = i64::from(places) - scale;
    let scaled = if shift >= 0 {
        digits * BigInt::from(10u32).pow(u32::try_from(shift).ok()?)
    } else {
        let divisor = BigInt::from(10u32).pow(u32::try_from(-shift).ok()?);
        if !(&digits % &divisor).is_zero() {
            return None;
        }
        digits / divisor
    };

    let (_, bytes) = scaled.to_bytes_be();
    U256::try_from_be_slice(&bytes)
}

/// Convert a basis-point fee (scale 1e5) into its decimal fraction.
pub fn fee_to_decimal(fee: u64) -> Decimal {
    to_decimal(U256::from(fee), FEE_DECIMALS)
}

fn u256_to_big_int(raw: U256) -> BigInt {
    BigInt::from_biguint(Sign::Plus, BigUint::from_bytes_be(&raw.to_be_bytes::<32>()))
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = bigdecimal::ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        value.to_canonical_string()
    }
}

impl TryFrom<String> for Decimal {
    type Error = bigdecimal::ParseBigDecimalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_canonical(&value)
    }
}

impl From<BigDecimal> for Decimal {
    fn from(value: BigDecimal) -> Self {
        Decimal(value)
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}
