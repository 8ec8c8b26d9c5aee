//! Derivative lots and their redemption history.

use super::decimal::Decimal;
use super::identity::{DerivativeLotKey, LotKey};
use super::keycode::Keycode;
use super::primitives::Provenance;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of derivative modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeKind {
    LinearVesting,
}

impl DerivativeKind {
    pub fn keycode(&self) -> Keycode {
        match self {
            DerivativeKind::LinearVesting => Keycode::new("LIV"),
        }
    }

    pub fn from_keycode(keycode: &Keycode) -> Option<Self> {
        match keycode.as_str() {
            "LIV" => Some(DerivativeKind::LinearVesting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VestingParamsError {
    #[error("vesting params must be at least 64 bytes, got {0}")]
    TooShort(usize),
    #[error("vesting timestamp does not fit in 48 bits")]
    Overflow,
}

/// Decoded linear-vesting schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearVestingParams {
    pub start: u64,
    pub expiry: u64,
}

impl LinearVestingParams {
    const WORD: usize = 32;
    const TIMESTAMP_MAX: u64 = (1 << 48) - 1;

    /// Decode `start` from bytes `[0, 32)` and `expiry` from `[32, 64)`.
    pub fn decode(params: &[u8]) -> Result<Self, VestingParamsError> {
        if params.len() < 2 * Self::WORD {
            return Err(VestingParamsError::TooShort(params.len()));
        }
        Ok(Self {
            start: decode_timestamp(&params[..Self::WORD])?,
            expiry: decode_timestamp(&params[Self::WORD..2 * Self::WORD])?,
        })
    }
}

/// Words are stored most-significant byte first; reverse them into
/// little-endian order before interpreting as an unsigned integer.
fn decode_timestamp(word: &[u8]) -> Result<u64, VestingParamsError> {
    let mut little_endian = word.to_vec();
    little_endian.reverse();
    let value = U256::from_le_slice(&little_endian);
    u64::try_from(value)
        .ok()
        .filter(|ts| *ts <= LinearVestingParams::TIMESTAMP_MAX)
        .ok_or(VestingParamsError::Overflow)
}

/// Derivative token minted for a lot's winners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivativeLot {
    pub id: DerivativeLotKey,
    pub chain: String,
    pub kind: DerivativeKind,
    pub module: Address,
    pub token_id: U256,
    pub lot: LotKey,
    pub underlying: Address,
    pub underlying_decimals: u8,
    pub start_timestamp: u64,
    pub expiry_timestamp: u64,
    pub wrapped: bool,
    pub created: Provenance,
}

/// One redemption; `remaining` is the holder's balance read after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub derivative_lot: DerivativeLotKey,
    pub user: Address,
    pub redeemed: Decimal,
    pub remaining: Decimal,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn test_decode_vesting_fixture() {
        let params = hex!("00000000000000000000000000000000000000000000000000000000663d011000000000000000000000000000000000000000000000000000000000663fa410");
        let decoded = LinearVestingParams::decode(&params).unwrap();
        assert_eq!(decoded.start, 1715274000);
        assert_eq!(decoded.expiry, 1715446800);
    }

    #[test]
    fn test_decode_rejects_short_params() {
        assert_eq!(
            LinearVestingParams::decode(&[0u8; 40]),
            Err(VestingParamsError::TooShort(40))
        );
    }

    #[test]
    fn test_decode_rejects_wide_timestamps() {
        let mut params = [0u8; 64];
        params[25] = 1; // bit 48 of the first word
        assert_eq!(
            LinearVestingParams::decode(&params),
            Err(VestingParamsError::Overflow)
        );
    }

    #[test]
    fn test_derivative_keycode_lookup() {
        assert_eq!(
            DerivativeKind::from_keycode(&Keycode::new("LIV")),
            Some(DerivativeKind::LinearVesting)
        );
        assert_eq!(DerivativeKind::from_keycode(&Keycode::new("XYZ")), None);
    }
}
