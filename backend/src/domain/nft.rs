//! NFT payloads exchanged with the indexer, the collection proxy and token
//! metadata hosts.
//!
//! Upstream documents are loosely shaped, so deserialisation is lenient:
//! optional fields default to empty and the embedded `metadata` may arrive as
//! an object, a JSON-encoded string or `null`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Summary metadata attached to a token reference by the indexer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Raw token reference returned by the collection proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftToken {
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: Option<NftMetadata>,
    #[serde(deserialize_with = "string_or_number")]
    pub token_id: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// Single trait on a resolved NFT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub trait_type: String,
    #[serde(default)]
    pub value: Value,
}

/// Displayable asset resolved from a token's metadata URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub external_url: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub token_id: String,
    /// Ordered as published by the metadata host.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub image: String,
}

/// NFT entry as listed by the indexing service for a wallet.
///
/// Only the fields the proxy inspects are typed; everything else is carried
/// through untouched so clients see the indexer's full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedNft {
    pub token_address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub token_id: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors returned when parsing collection configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionConfigError {
    #[error("contract address must be 0x followed by hexadecimal digits")]
    InvalidContract,
    #[error("unsupported chain `{0}`")]
    UnsupportedChain(String),
}

/// Contract whose tokens make up the collection. Stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractAddress(String);

impl ContractAddress {
    /// Parse a contract address, normalising it to lowercase.
    ///
    /// # Examples
    /// ```
    /// use parallel_connect::domain::ContractAddress;
    ///
    /// let contract = ContractAddress::new("0xDEF").unwrap();
    /// assert!(contract.matches("0xdef"));
    /// assert!(contract.matches("0xDeF"));
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, CollectionConfigError> {
        let trimmed = value.as_ref().trim().to_ascii_lowercase();
        let digits = trimmed
            .strip_prefix("0x")
            .ok_or(CollectionConfigError::InvalidContract)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CollectionConfigError::InvalidContract);
        }
        Ok(Self(trimmed))
    }

    /// Case-insensitive comparison against an indexer `token_address`.
    pub fn matches(&self, token_address: &str) -> bool {
        self.0.eq_ignore_ascii_case(token_address.trim())
    }
}

impl AsRef<str> for ContractAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chain queried by the collection proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Chain {
    #[default]
    Ethereum,
    Sepolia,
}

impl Chain {
    /// Identifier understood by the indexing API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ethereum => "eth",
            Self::Sepolia => "sepolia",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = CollectionConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eth" | "ethereum" | "mainnet" | "0x1" => Ok(Self::Ethereum),
            "sepolia" | "0xaa36a7" => Ok(Self::Sepolia),
            other => Err(CollectionConfigError::UnsupportedChain(other.to_owned())),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<NftMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => serde_json::from_value(Value::Object(map)).ok(),
        Some(Value::String(text)) => serde_json::from_str(&text).ok(),
        _ => None,
    })
}
