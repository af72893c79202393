//! Delivery and admin dashboard endpoints.

use super::{
    auth::CurrentUser,
    extract::{JsonBody, PathParam},
    state::AppState,
};
use crate::{
    core::{
        dashboard::{AdminDashboard, admin_dashboard},
        delivery::{
            AssignDelivery, DeliveryUpdate, LocationPing, assign_delivery, deliveries_for_agent,
            drop_off, pickup, record_location,
        },
        user::require_role,
    },
    entities::{UserRole, delivery_assignment, delivery_location},
    errors::Result,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

/// `POST /api/deliveries/assign` (admin)
pub async fn assign_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(request): JsonBody<AssignDelivery>,
) -> Result<Json<delivery_assignment::Model>> {
    Ok(Json(assign_delivery(&state.db, &actor, request).await?))
}

/// `GET /api/deliveries` (agent)
pub async fn my_deliveries_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<delivery_assignment::Model>>> {
    require_role(&actor, UserRole::DeliveryAgent, "list deliveries")?;
    Ok(Json(deliveries_for_agent(&state.db, actor.id).await?))
}

/// `POST /api/deliveries/{id}/pickup` (assigned agent)
pub async fn pickup_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(delivery_id): PathParam<i64>,
) -> Result<Json<DeliveryUpdate>> {
    Ok(Json(pickup(&state.db, &actor, delivery_id).await?))
}

/// `POST /api/deliveries/{id}/drop` (assigned agent)
pub async fn drop_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(delivery_id): PathParam<i64>,
) -> Result<Json<DeliveryUpdate>> {
    Ok(Json(drop_off(&state.db, &actor, delivery_id).await?))
}

/// `POST /api/deliveries/{id}/locations` (assigned agent)
pub async fn location_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(delivery_id): PathParam<i64>,
    JsonBody(ping): JsonBody<LocationPing>,
) -> Result<(StatusCode, Json<delivery_location::Model>)> {
    let recorded = record_location(&state.db, &actor, delivery_id, ping).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// `GET /api/admin/dashboard`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<AdminDashboard>> {
    Ok(Json(admin_dashboard(&state.db, &actor).await?))
}
