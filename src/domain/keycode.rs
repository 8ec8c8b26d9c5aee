//! Module references ("veecodes") and the keycodes they carry.

use alloy_primitives::FixedBytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seven-byte module reference: two ASCII version digits followed by a
/// five-byte keycode right-padded with zero bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Veecode(pub FixedBytes<7>);

impl Veecode {
    pub fn new(bytes: [u8; 7]) -> Self {
        Veecode(FixedBytes(bytes))
    }

    /// Build a veecode from a version and a keycode, e.g. `(1, "EMPA")`.
    pub fn from_parts(version: u8, keycode: &str) -> Self {
        let mut bytes = [0u8; 7];
        bytes[0] = b'0' + (version / 10) % 10;
        bytes[1] = b'0' + version % 10;
        for (slot, byte) in bytes[2..].iter_mut().zip(keycode.bytes()) {
            *slot = byte;
        }
        Veecode::new(bytes)
    }

    /// All-zero references mean "no module".
    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }

    /// Two-digit version, if both version bytes are ASCII digits.
    pub fn version(&self) -> Option<u8> {
        let [hi, lo] = [self.0[0], self.0[1]];
        if hi.is_ascii_digit() && lo.is_ascii_digit() {
            Some((hi - b'0') * 10 + (lo - b'0'))
        } else {
            None
        }
    }

    /// Keycode with trailing padding stripped.
    pub fn keycode(&self) -> Keycode {
        let raw = &self.0[2..];
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        Keycode(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}

/// Short tag naming the pricing, settlement or derivative module of a lot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keycode(pub String);

impl Keycode {
    pub fn new(code: impl Into<String>) -> Self {
        Keycode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
