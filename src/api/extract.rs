//! Request extractors shared by the handlers

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::utils::AppError;

/// JSON request body, accepted whatever the `Content-Type` header says.
///
/// Browser clients post chat actions without setting a content type, so the
/// body is read as bytes and decoded directly. Failures render as
/// [`AppError`] JSON bodies.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        parse_json_body(&body).map(ApiJson)
    }
}

/// Decode a JSON body that has already been read.
///
/// Handlers that must check access before looking at the body take `Bytes`
/// and call this afterwards.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    Ok(serde_json::from_slice(body)?)
}
