//! Domain models for the marketplace.
//!
//! Each model maps one-to-one onto a table row and is serialized as the
//! JSON body returned by the HTTP API. Binary payloads are base64 encoded.

pub mod catalog;
pub mod engagement;
pub mod order;
pub mod user;

pub use catalog::{Item, Store};
pub use engagement::{Click, Search, SearchItem};
pub use order::Order;
pub use user::User;

/// Serde helpers for optional binary columns rendered as base64 strings.
pub(crate) mod blob {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    /// A blob is absent when the column is `NULL` or holds zero bytes.
    #[allow(clippy::ref_option)] // signature required by `skip_serializing_if`
    pub fn is_absent(value: &Option<Vec<u8>>) -> bool {
        value.as_ref().is_none_or(Vec::is_empty)
    }

    #[allow(clippy::ref_option)] // signature required by `serialize_with`
    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => STANDARD
                .decode(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }

    /// Encode a payload list for the `{"images": [...]}` response body.
    pub fn encode_all(payloads: &[Vec<u8>]) -> Vec<String> {
        payloads.iter().map(|bytes| STANDARD.encode(bytes)).collect()
    }
}
