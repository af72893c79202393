//! Account endpoints.

use super::{
    auth::CurrentUser,
    extract::{JsonBody, PathParam, QueryParams},
    state::AppState,
};
use crate::{
    core::user::{
        AgentUpdate, NewUser, create_user, delete_agent, list_users_by_role, require_role,
        require_user, update_agent,
    },
    entities::{UserRole, user},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

/// `?role=` filter for the user listing.
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    /// Role to list
    pub role: UserRole,
}

/// `GET /api/users?role=` (admin)
pub async fn list_users_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    QueryParams(query): QueryParams<RoleQuery>,
) -> Result<Json<Vec<user::Model>>> {
    require_role(&actor, UserRole::Admin, "list users")?;
    Ok(Json(list_users_by_role(&state.db, query.role).await?))
}

/// `POST /api/users`
///
/// Anyone may register a Customer account; every other role is created by an admin.
pub async fn create_user_handler(
    State(state): State<AppState>,
    actor: Option<CurrentUser>,
    JsonBody(input): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<user::Model>)> {
    match actor {
        Some(CurrentUser(actor)) if actor.role != UserRole::Admin && input.role != UserRole::Customer => {
            return Err(Error::forbidden(
                actor.role,
                format!("create {} accounts", input.role),
            ));
        }
        None if input.role != UserRole::Customer => return Err(Error::Unauthenticated),
        _ => {}
    }
    let created = create_user(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/users/{id}` (admin or self)
pub async fn get_user_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(user_id): PathParam<i64>,
) -> Result<Json<user::Model>> {
    if actor.role != UserRole::Admin && actor.id != user_id {
        return Err(Error::forbidden(actor.role, format!("view user {user_id}")));
    }
    Ok(Json(require_user(&state.db, user_id).await?))
}

/// `PUT /api/users/{id}` (admin, delivery agents only)
pub async fn update_agent_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(agent_id): PathParam<i64>,
    JsonBody(update): JsonBody<AgentUpdate>,
) -> Result<Json<user::Model>> {
    require_role(&actor, UserRole::Admin, "edit delivery agents")?;
    Ok(Json(update_agent(&state.db, agent_id, update).await?))
}

/// `DELETE /api/users/{id}` (admin, delivery agents only)
pub async fn delete_agent_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(agent_id): PathParam<i64>,
) -> Result<StatusCode> {
    require_role(&actor, UserRole::Admin, "delete delivery agents")?;
    delete_agent(&state.db, agent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
