//! Chain identifiers and network descriptors
//!
//! A [`ChainId`] travels over the wallet protocol as `0x`-prefixed lowercase
//! hex without leading zeros; a [`NetworkDescriptor`] is the exact payload of
//! `wallet_addEthereumChain`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chain id: {0}")]
pub struct ChainIdError(pub String);

/// Integer network identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const POLYGON: ChainId = ChainId(137);
    pub const POLYGON_MUMBAI: ChainId = ChainId(80001);

    pub fn value(&self) -> u64 { self.0 }

    /// `80001` → `"0x13881"`
    pub fn to_hex(&self) -> String { format!("{:#x}", self.0) }

    /// Accepts `"0x89"`, `"137"` or surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, ChainIdError> {
        let v = value.trim();
        let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => v.parse::<u64>(),
        };
        parsed.map(ChainId).map_err(|_| ChainIdError(value.to_string()))
    }

    /// Wallets answer `eth_chainId` with a hex string; some dev nodes and
    /// legacy providers answer with a bare number.
    pub fn from_json(value: &Value) -> Result<Self, ChainIdError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n.as_u64().map(ChainId).ok_or_else(|| ChainIdError(n.to_string())),
            other => Err(ChainIdError(other.to_string())),
        }
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self { ChainId(value) }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        ChainId::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

/// The pair of networks an application deploys to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTarget {
    pub mainnet_id: ChainId,
    pub testnet_id: ChainId,
}

impl NetworkTarget {
    pub fn new(mainnet_id: impl Into<ChainId>, testnet_id: impl Into<ChainId>) -> Self {
        Self { mainnet_id: mainnet_id.into(), testnet_id: testnet_id.into() }
    }

    pub fn polygon() -> Self { Self::new(ChainId::POLYGON, ChainId::POLYGON_MUMBAI) }

    pub fn select(&self, use_testnet: bool) -> ChainId {
        if use_testnet { self.testnet_id } else { self.mainnet_id }
    }
}

impl Default for NetworkTarget {
    fn default() -> Self { Self::polygon() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    /// Every network this crate ships uses 18-decimal native currency.
    pub fn eighteen(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self { name: name.into(), symbol: symbol.into(), decimals: 18 }
    }
}

/// `wallet_addEthereumChain` parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    #[serde(with = "hex_chain_id")]
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    pub fn new(chain_id: impl Into<ChainId>, chain_name: impl Into<String>, native_currency: NativeCurrency) -> Self {
        Self {
            chain_id: chain_id.into(),
            chain_name: chain_name.into(),
            native_currency,
            rpc_urls: Vec::new(),
            block_explorer_urls: Vec::new(),
        }
    }
    pub fn with_rpc(mut self, url: impl Into<String>) -> Self { self.rpc_urls.push(url.into()); self }
    pub fn with_explorer(mut self, url: impl Into<String>) -> Self { self.block_explorer_urls.push(url.into()); self }

    pub fn polygon_mainnet() -> Self {
        Self::new(ChainId::POLYGON, "Polygon Mainnet", NativeCurrency::eighteen("MATIC", "MATIC"))
            .with_rpc("https://polygon-rpc.com")
            .with_explorer("https://polygonscan.com")
    }

    pub fn polygon_mumbai() -> Self {
        Self::new(ChainId::POLYGON_MUMBAI, "Polygon Mumbai Testnet", NativeCurrency::eighteen("MATIC", "MATIC"))
            .with_rpc("https://rpc-mumbai.maticvigil.com")
            .with_explorer("https://mumbai.polygonscan.com")
    }
}

/// Descriptors registered by default.
pub fn known_networks() -> Vec<NetworkDescriptor> {
    vec![NetworkDescriptor::polygon_mainnet(), NetworkDescriptor::polygon_mumbai()]
}

mod hex_chain_id {
    use super::ChainId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &ChainId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ChainId, D::Error> {
        ChainId::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hex_rendering() {
        assert_eq!(ChainId(80001).to_hex(), "0x13881");
        assert_eq!(ChainId(137).to_hex(), "0x89");
        assert_eq!(ChainId(1).to_hex(), "0x1");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(ChainId::parse("0x89").unwrap(), ChainId(137));
        assert_eq!(ChainId::parse("0X13881").unwrap(), ChainId(80001));
        assert_eq!(ChainId::parse(" 137 ").unwrap(), ChainId(137));
        assert!(ChainId::parse("0xzz").is_err());
        assert!(ChainId::parse("polygon").is_err());
    }

    #[test]
    fn test_from_json() {
        assert_eq!(ChainId::from_json(&json!("0x89")).unwrap(), ChainId(137));
        assert_eq!(ChainId::from_json(&json!(80001)).unwrap(), ChainId(80001));
        assert!(ChainId::from_json(&json!(null)).is_err());
        assert!(ChainId::from_json(&json!(-1)).is_err());
    }

    #[test]
    fn test_target_select() {
        let target = NetworkTarget::new(137u64, 80001u64);
        assert_eq!(target.select(false), ChainId(137));
        assert_eq!(target.select(true), ChainId(80001));
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let value = serde_json::to_value(NetworkDescriptor::polygon_mumbai()).unwrap();
        assert_eq!(
            value,
            json!({
                "chainId": "0x13881",
                "chainName": "Polygon Mumbai Testnet",
                "nativeCurrency": {"name": "MATIC", "symbol": "MATIC", "decimals": 18},
                "rpcUrls": ["https://rpc-mumbai.maticvigil.com"],
                "blockExplorerUrls": ["https://mumbai.polygonscan.com"]
            })
        );
    }

    #[test]
    fn test_descriptor_parses_back() {
        let value = serde_json::to_value(NetworkDescriptor::polygon_mainnet()).unwrap();
        let parsed: NetworkDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.chain_id, ChainId::POLYGON);
    }
}
