//! Stealth key records.
//!
//! A record holds a spending and a viewing public key, each split into a
//! small prefix tag and a 32-byte coordinate. The registry stores and returns
//! them verbatim; nothing here interprets them as curve points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 256-bit unsigned value stored big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct KeyWord(pub [u8; 32]);

impl KeyWord {
    pub const ZERO: KeyWord = KeyWord([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Parse up to 64 hex digits, `0x` optional. Shorter input is left-padded
    /// with zeros, so `0x0a` is the value 10.
    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        let payload = value.strip_prefix("0x").unwrap_or(value);
        if payload.len() > 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let padded = format!("{payload:0>64}");
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(padded, &mut bytes)?;
        Ok(KeyWord(bytes))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<u64> for KeyWord {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        KeyWord(bytes)
    }
}

impl From<[u8; 32]> for KeyWord {
    fn from(value: [u8; 32]) -> Self {
        KeyWord(value)
    }
}

impl fmt::Debug for KeyWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyWord({})", self.to_hex())
    }
}

/// Spending and viewing public keys attached to a node.
///
/// `StealthKeys::default()` is the unset record; writing it is how a record
/// is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StealthKeys {
    pub spending_pub_key_prefix: u8,
    pub spending_pub_key: KeyWord,
    pub viewing_pub_key_prefix: u8,
    pub viewing_pub_key: KeyWord,
}

impl StealthKeys {
    pub fn new(
        spending_pub_key_prefix: u8,
        spending_pub_key: impl Into<KeyWord>,
        viewing_pub_key_prefix: u8,
        viewing_pub_key: impl Into<KeyWord>,
    ) -> Self {
        Self {
            spending_pub_key_prefix,
            spending_pub_key: spending_pub_key.into(),
            viewing_pub_key_prefix,
            viewing_pub_key: viewing_pub_key.into(),
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    /// The four fields in storage order.
    pub fn as_tuple(&self) -> (u8, KeyWord, u8, KeyWord) {
        (
            self.spending_pub_key_prefix,
            self.spending_pub_key,
            self.viewing_pub_key_prefix,
            self.viewing_pub_key,
        )
    }
}
