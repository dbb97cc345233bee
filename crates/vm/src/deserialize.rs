use bytes::Bytes;
use ethereum_types::U256;
use serde::{Deserialize, Deserializer, de};
use std::collections::HashMap;

/// Parses `"0x"` prefixed hex or decimal.
pub fn parse_u256_str(s: &str) -> Result<U256, String> {
    if let Some(hex) = s.strip_prefix("0x") {
        U256::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        U256::from_dec_str(s).map_err(|e| e.to_string())
    }
}

pub fn parse_hex_bytes(s: &str) -> Result<Bytes, String> {
    hex::decode(s.trim_start_matches("0x"))
        .map(Bytes::from)
        .map_err(|err| format!("error decoding hex data when deserializing bytes: {err}"))
}

/// Accepts `"0x"` prefixed hex or decimal strings. A missing value or `null` is zero.
pub fn deserialize_u256_str<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;

    match s {
        Some(s) => parse_u256_str(&s).map_err(de::Error::custom),
        None => Ok(U256::default()),
    }
}

pub fn deserialize_hex_bytes<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_hex_bytes(&s).map_err(de::Error::custom)
}

pub fn deserialize_optional_hex_bytes<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| parse_hex_bytes(&s).map_err(de::Error::custom))
        .transpose()
}

pub fn deserialize_u256_valued_hashmap<'de, D>(
    deserializer: D,
) -> Result<HashMap<U256, U256>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = HashMap::<String, String>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(k, v)| {
            let key = parse_u256_str(&k)
                .map_err(|err| de::Error::custom(format!("(key) error parsing U256: {err}")))?;
            let value = parse_u256_str(&v)
                .map_err(|err| de::Error::custom(format!("(value) error parsing U256: {err}")))?;
            Ok((key, value))
        })
        .collect()
}
