//! Acting-user extraction.
//!
//! Sessions live in front of this service. Whatever terminates them forwards
//! the authenticated user's id in the `X-User-Id` header.

use super::state::AppState;
use crate::{
    core::user::get_user,
    entities::user,
    errors::{Error, Result},
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::debug;

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-user-id";

/// The user a request acts as. Rejects with 401 when absent or unknown.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

fn header_user_id(parts: &Parts) -> Result<Option<i64>> {
    let Some(value) = parts.headers.get(USER_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or(Error::Unauthenticated)
}

async fn load(state: &AppState, user_id: i64) -> Result<CurrentUser> {
    let found = get_user(&state.db, user_id).await?.ok_or_else(|| {
        debug!("Unknown user {} in {} header", user_id, USER_HEADER);
        Error::Unauthenticated
    })?;
    Ok(CurrentUser(found))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user_id = header_user_id(parts)?.ok_or(Error::Unauthenticated)?;
        load(state, user_id).await
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        match header_user_id(parts)? {
            Some(user_id) => load(state, user_id).await.map(Some),
            None => Ok(None),
        }
    }
}
