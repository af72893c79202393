//! HTTP mapping of [`Error`].

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

/// Status code reported for an error.
#[must_use]
pub const fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Error::Conflict { .. }
        | Error::InvalidTransition { .. }
        | Error::InvalidDeliveryState { .. } => StatusCode::CONFLICT,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Forbidden { .. } => StatusCode::FORBIDDEN,
        Error::Unauthenticated => StatusCode::UNAUTHORIZED,
        Error::Validation { .. }
        | Error::InvalidQuantity { .. }
        | Error::InvalidPrice { .. }
        | Error::RestaurantInactive { .. }
        | Error::ItemUnavailable { .. }
        | Error::EmptyCart
        | Error::NoValidItems => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        // internal details stay in the log
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
