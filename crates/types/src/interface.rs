use crate::node::keccak256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-byte interface tag, compared only for equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceId(pub [u8; 4]);

impl InterfaceId {
    /// `supportsInterface(bytes4)`, the capability query entry point itself.
    pub const SUPPORTS_INTERFACE: InterfaceId = InterfaceId([0x01, 0xff, 0xc9, 0xa7]);
    /// `addr(bytes32)`
    pub const ADDR: InterfaceId = InterfaceId([0x3b, 0x3b, 0x57, 0xde]);
    /// `name(bytes32)`
    pub const NAME: InterfaceId = InterfaceId([0x69, 0x1f, 0x34, 0x31]);
    /// `text(bytes32,string)`
    pub const TEXT: InterfaceId = InterfaceId([0x59, 0xd1, 0xd4, 0x3c]);
    /// Never implemented by anything.
    pub const INVALID: InterfaceId = InterfaceId([0xff, 0xff, 0xff, 0xff]);

    /// First four bytes of the keccak-256 hash of a function signature.
    pub fn from_signature(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        InterfaceId([hash[0], hash[1], hash[2], hash[3]])
    }

    /// `interfaceImplementer(bytes32,bytes4)`
    pub fn interface_implementer() -> Self {
        Self::from_signature("interfaceImplementer(bytes32,bytes4)")
    }

    /// `stealthKeys(bytes32)`
    pub fn stealth_keys() -> Self {
        Self::from_signature("stealthKeys(bytes32)")
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({})", self.to_hex())
    }
}

impl From<[u8; 4]> for InterfaceId {
    fn from(value: [u8; 4]) -> Self {
        InterfaceId(value)
    }
}
