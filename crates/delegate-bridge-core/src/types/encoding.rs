/*
[INPUT]:  Raw byte buffers and nanosecond timestamps
[OUTPUT]: Hex string representations for JSON payloads
[POS]:    Data layer - serde helpers shared by wire and storage types
[UPDATE]: When byte or timestamp encodings change
*/

/// Bytes as a lowercase hex string.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        hex::decode(value.trim()).map_err(serde::de::Error::custom)
    }
}

/// Nanosecond timestamps as a hex string, matching how bigint expirations are exported.
pub mod hex_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = String::deserialize(deserializer)?;
        let digits = value.trim().trim_start_matches("0x");
        u64::from_str_radix(digits, 16).map_err(serde::de::Error::custom)
    }
}

/// Optional list of byte buffers, each hex encoded.
pub mod opt_hex_list {
    use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(
        values: &Option<Vec<Vec<u8>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match values {
            Some(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(&hex::encode(value))?;
                }
                seq.end()
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Vec<u8>>>, D::Error> {
        let values: Option<Vec<String>> = Option::deserialize(deserializer)?;
        values
            .map(|values| {
                values
                    .iter()
                    .map(|value| hex::decode(value.trim()).map_err(serde::de::Error::custom))
                    .collect()
            })
            .transpose()
    }
}
