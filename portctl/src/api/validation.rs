//! Request extraction with field validation.
//!
//! [`ValidatedJson`] decodes a JSON body with serde and then runs the `validator` rules
//! declared on the payload type. Both decode failures and rule failures are reported as
//! `400 Bad Request`, so a handler only ever sees well-formed input.
//!
//! [`Path`] and [`Query`] wrap the axum extractors of the same name so that malformed ids and
//! query strings are rejected with the usual `{"error": ...}` JSON body instead of plain text.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::errors::Error;

/// JSON body extractor that rejects invalid payloads instead of coercing them
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| Error::BadRequest {
                message: rejection.body_text(),
            })?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters, rejected as JSON `400 Bad Request` when they don't parse
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| Error::BadRequest {
                message: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// Query string parameters, rejected as JSON `400 Bad Request` when they don't parse
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) = axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| Error::BadRequest {
                message: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// Rule for quantities and prices: strictly greater than zero
pub fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive").with_message("must be greater than zero".into()))
    }
}
