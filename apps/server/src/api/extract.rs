//! Request extractors that report failures in the API's error shape.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::{error::FieldError, Error, Result};

/// JSON body that has passed both serde and `validator` checks.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Raw JSON object for partial updates; merged and validated by the caller.
pub struct PatchBody(pub JsonValue);

#[async_trait]
impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<JsonValue>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        if !value.is_object() {
            return Err(Error::Validation(vec![FieldError::new(
                "",
                "update body must be a JSON object",
            )]));
        }
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> Error {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            Error::Validation(vec![FieldError::new("", e.body_text())])
        }
        JsonRejection::JsonSyntaxError(e) => {
            Error::Validation(vec![FieldError::new("", e.body_text())])
        }
        other => Error::BadRequest(other.body_text()),
    }
}

/// Numeric path id; anything else is a 400 `Invalid ID`.
pub fn parse_id(raw: &str) -> Result<i32> {
    raw.parse::<i32>()
        .map_err(|_| Error::InvalidId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(Error::InvalidId(_))));
        assert!(matches!(parse_id("1.5"), Err(Error::InvalidId(_))));
    }
}
