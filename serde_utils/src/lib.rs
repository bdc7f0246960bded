//! Tiny `serde` helpers for the handful of fixed-size byte arrays that appear in network
//! [`types::config::Config`] files (fork versions, the deposit contract address): consensus
//! network-config files spell these as `0x`-prefixed hex strings rather than JSON arrays.

pub mod prefixed_hex_fixed_size_array {
    use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let string = String::deserialize(deserializer)?;
        let trimmed = string.strip_prefix("0x").unwrap_or(&string);

        let vector = hex::decode(trimmed).map_err(D::Error::custom)?;

        vector.try_into().map_err(|vector: Vec<u8>| {
            D::Error::custom(format!(
                "expected {N} bytes, got {} ({string})",
                vector.len(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "crate::prefixed_hex_fixed_size_array")]
        version: [u8; 4],
    }

    #[test]
    fn round_trips_through_json() {
        let original = Wrapper {
            version: [0, 1, 2, 3],
        };

        let json = serde_json::to_string(&original).expect("serialization cannot fail");
        assert_eq!(json, r#"{"version":"0x00010203"}"#);

        let decoded: Wrapper = serde_json::from_str(&json).expect("round-trip should succeed");
        assert_eq!(decoded, original);
    }

    #[test]
    fn rejects_wrong_length() {
        let error = serde_json::from_str::<Wrapper>(r#"{"version":"0x0001"}"#).unwrap_err();
        assert!(error.to_string().contains("expected 4 bytes"));
    }
}
