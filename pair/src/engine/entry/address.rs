//! Address Types
//!
//! 20-byte account and contract identifiers, keccak hashing and the
//! derivation of development accounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing an address from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Computes the keccak256 digest of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// An account or contract address
///
/// The zero address is the sentinel for "no address": an empty waiting slot,
/// an unpaired account, an unminted token owner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    /// Takes the low 20 bytes of the keccak256 digest of `data`
    pub fn from_hash(data: &[u8]) -> Self {
        let digest = keccak256(data);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Address(bytes)
    }

    /// Address of a contract created by `sender` with the given nonce
    pub fn create(sender: &Address, nonce: u64) -> Self {
        let mut preimage = Vec::with_capacity(28);
        preimage.extend_from_slice(sender.as_bytes());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        Address::from_hash(&preimage)
    }

    /// Mixed-case checksum encoding (EIP-55)
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 20] = raw
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(raw.len()))?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Derives `count` deterministic development accounts from `seed`
pub fn dev_accounts(seed: &str, count: usize) -> Vec<Address> {
    (0..count as u64)
        .map(|i| {
            let mut preimage = seed.as_bytes().to_vec();
            preimage.extend_from_slice(&i.to_be_bytes());
            Address::from_hash(&preimage)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_display() {
        let addr: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(addr.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

        let again: Address = addr.to_string().parse().unwrap();
        assert_eq!(again, addr);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        ));
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(Address::default().is_zero());
        assert_eq!(
            Address::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_create_depends_on_nonce() {
        let sender = Address::from_hash(b"deployer");
        assert_ne!(Address::create(&sender, 0), Address::create(&sender, 1));
        assert_eq!(Address::create(&sender, 3), Address::create(&sender, 3));
    }

    #[test]
    fn test_dev_accounts_deterministic() {
        let a = dev_accounts("pair", 4);
        let b = dev_accounts("pair", 4);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert_ne!(a[0], a[1]);
        assert_ne!(dev_accounts("other", 1)[0], a[0]);
    }

    #[test]
    fn test_serde_as_string() {
        let addr = Address::from_hash(b"x");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let bytes = bincode::serialize(&addr).unwrap();
        let back: Address = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, addr);
    }
}
