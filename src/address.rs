use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::InvalidIntent;

/// A 20-byte EVM account address.
///
/// Parsing accepts all-lowercase, all-uppercase or EIP-55 mixed case hex;
/// mixed case input must carry a valid checksum. Display always prints the
/// checksummed form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmAddress(Address);

impl EvmAddress {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(Address::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        self.0.as_fixed_bytes()
    }

    pub fn to_checksum(&self) -> String {
        to_checksum(&self.0, None)
    }
}

impl FromStr for EvmAddress {
    type Err = InvalidIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(InvalidIntent::EmptyAddress);
        }
        let malformed = |why: &str| InvalidIntent::MalformedAddress(format!("{}: {}", s, why));

        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| malformed("missing 0x prefix"))?;
        if body.len() != 40 {
            return Err(malformed("expected 40 hex characters"));
        }

        let address = Self(Address::from_str(body).map_err(|_| malformed("not hexadecimal"))?);

        let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum() != s {
            return Err(malformed("checksum mismatch"));
        }

        Ok(address)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvmAddress({})", self.to_checksum())
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EvmAddress::from_str(&s).map_err(de::Error::custom)
    }
}

impl From<EvmAddress> for Address {
    fn from(address: EvmAddress) -> Self {
        address.0
    }
}

impl From<Address> for EvmAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}
