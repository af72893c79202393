//! Request extractors whose rejections use the API's error body.
//!
//! axum's own `Json`, `Query` and `Path` reject with plain-text 4xx responses.
//! These wrappers turn every rejection into [`Error::Validation`], so malformed
//! input gets `400 {"error": ...}` like any other validation failure.

use crate::errors::Error;
use axum::extract::{
    FromRequest, FromRequestParts, OptionalFromRequest, Request,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// `Option<JsonBody<T>>` is `None` when the request carries no `Content-Type`.
impl<T, S> OptionalFromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let body = <axum::Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
        Ok(body.map(|axum::Json(value)| Self(value)))
    }
}

/// Query-string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected JSON body: {}", rejection.body_text());
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}
