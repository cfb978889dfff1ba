//! Request extractors with JSON error bodies.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::error::AppError;

/// `Json<T>` whose rejections render as `400 {"error": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_json(&rejection)),
        }
    }
}

fn bad_json(rejection: &JsonRejection) -> AppError {
    AppError::BadRequest(format!("Invalid request payload: {}", rejection.body_text()))
}

/// Deserialize an identifier sent either as a JSON string or a number.
///
/// Missing values and `null` become an empty string so required-field
/// validation reports them.
///
/// # Errors
///
/// Fails for JSON values other than strings, integers and `null`.
pub fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "text_or_number")]
        user_id: String,
    }

    #[test]
    fn test_text_or_number() {
        let parse = |json: &str| serde_json::from_str::<Body>(json).unwrap().user_id;
        assert_eq!(parse(r#"{"user_id": "12"}"#), "12");
        assert_eq!(parse(r#"{"user_id": 12}"#), "12");
        assert_eq!(parse(r#"{"user_id": null}"#), "");
        assert_eq!(parse("{}"), "");
        assert!(serde_json::from_str::<Body>(r#"{"user_id": [1]}"#).is_err());
    }
}
