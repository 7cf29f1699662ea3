//! Account addresses: 32 raw bytes, rendered as bech32 with the `erd` prefix.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use std::fmt;
use std::str::FromStr;

use crate::SchemaError;

pub const ADDRESS_LEN: usize = 32;

const HRP_STR: &str = "erd";
const HRP: Hrp = Hrp::parse_unchecked(HRP_STR);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            SchemaError::InvalidAddress(format!(
                "expected {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn from_bech32(s: &str) -> Result<Self, SchemaError> {
        // Classic bech32 checksum only; bech32m strings fail here.
        let checked = CheckedHrpstring::new::<Bech32>(s)
            .map_err(|e| SchemaError::InvalidAddress(format!("{s}: {e}")))?;
        let hrp = checked.hrp();
        if !hrp.to_string().eq_ignore_ascii_case(HRP_STR) {
            return Err(SchemaError::InvalidAddress(format!(
                "{s}: unexpected prefix `{hrp}`"
            )));
        }
        let data: Vec<u8> = checked.byte_iter().collect();
        Self::from_slice(&data)
    }

    pub fn to_bech32(&self) -> String {
        // 32 bytes under a 3-char prefix is always within bech32 length limits.
        bech32::encode::<Bech32>(HRP, &self.0).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Contract addresses start with eight zero bytes.
    pub fn is_smart_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl FromStr for Address {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_bech32(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}
