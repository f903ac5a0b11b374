//! Serialize base-unit amounts as decimal strings
//!
//! JSON numbers lose precision past 2^53, so amounts travel as `"1000000"`.

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    let raw = String::deserialize(deserializer)?;
    U256::from_str_radix(&raw, 10).map_err(serde::de::Error::custom)
}
