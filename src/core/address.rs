//! Account addresses: 20-byte hex, stored lowercase with `0x` prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
    #[error("address must be {ADDRESS_LEN} bytes, got {0}")]
    WrongLength(usize),
}

/// Wallet account address. Parsing accepts any case (checksummed or not)
/// and normalizes to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        let trimmed = value.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(trimmed.to_string()))?;
        let bytes = hex::decode(body).map_err(|_| AddressError::InvalidHex(trimmed.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::WrongLength(bytes.len()));
        }
        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn to_bytes(&self) -> [u8; ADDRESS_LEN] {
        let mut out = [0u8; ADDRESS_LEN];
        // Validated on construction.
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }

    /// `0x1234…abcd` form for notices and logs.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksummed_is_lowercased() {
        let addr = Address::parse("0xAbCdEf0123456789aBcDeF0123456789AbCd1234").unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcd1234");
    }

    #[test]
    fn test_short_form() {
        let addr = Address::parse("0xabcdef0123456789abcdef0123456789abcd1234").unwrap();
        assert_eq!(addr.short(), "0xabcd…1234");
    }

    #[test]
    fn test_to_bytes() {
        let addr = Address::parse("0x00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(addr.to_bytes()[19], 0xff);
        assert_eq!(addr.to_bytes()[0], 0);
    }

    #[test]
    fn test_rejects_missing_prefix() {
        assert!(matches!(
            Address::parse("abcdef0123456789abcdef0123456789abcd1234"),
            Err(AddressError::MissingPrefix(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(Address::parse("0x1234"), Err(AddressError::WrongLength(2)));
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(matches!(
            Address::parse("0xzzcdef0123456789abcdef0123456789abcd1234"),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_normalizes() {
        let addr: Address = serde_json::from_str("\"0xABCDEF0123456789ABCDEF0123456789ABCD1234\"").unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"0xabcdef0123456789abcdef0123456789abcd1234\"");
    }
}
