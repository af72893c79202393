//! Restaurant and menu endpoints.

use super::{
    auth::CurrentUser,
    extract::{JsonBody, PathParam, QueryParams},
    state::AppState,
};
use crate::{
    core::{
        menu::{
            MenuFilter, MenuItemInput, create_menu_item, delete_menu_item, list_menu,
            update_menu_item,
        },
        restaurant::{
            RestaurantFilter, RestaurantInput, create_restaurant, delete_restaurant,
            list_restaurants, require_restaurant, update_restaurant,
        },
        user::require_role,
    },
    entities::{MenuCategory, UserRole, menu_item, restaurant},
    errors::Result,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /api/restaurants?q=&status=`
pub async fn list_restaurants_handler(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<RestaurantFilter>,
) -> Result<Json<Vec<restaurant::Model>>> {
    Ok(Json(list_restaurants(&state.db, &filter).await?))
}

/// `POST /api/restaurants` (admin)
pub async fn create_restaurant_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(input): JsonBody<RestaurantInput>,
) -> Result<(StatusCode, Json<restaurant::Model>)> {
    require_role(&actor, UserRole::Admin, "create restaurants")?;
    let created = create_restaurant(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/restaurants/{id}`
pub async fn get_restaurant_handler(
    State(state): State<AppState>,
    PathParam(restaurant_id): PathParam<i64>,
) -> Result<Json<restaurant::Model>> {
    Ok(Json(require_restaurant(&state.db, restaurant_id).await?))
}

/// `PUT /api/restaurants/{id}` (admin)
pub async fn update_restaurant_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(restaurant_id): PathParam<i64>,
    JsonBody(input): JsonBody<RestaurantInput>,
) -> Result<Json<restaurant::Model>> {
    require_role(&actor, UserRole::Admin, "edit restaurants")?;
    Ok(Json(update_restaurant(&state.db, restaurant_id, input).await?))
}

/// `DELETE /api/restaurants/{id}` (admin)
pub async fn delete_restaurant_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(restaurant_id): PathParam<i64>,
) -> Result<StatusCode> {
    require_role(&actor, UserRole::Admin, "delete restaurants")?;
    delete_restaurant(&state.db, restaurant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/restaurants/{id}/menu?category=&only_available=&q=`
pub async fn menu_handler(
    State(state): State<AppState>,
    PathParam(restaurant_id): PathParam<i64>,
    QueryParams(filter): QueryParams<MenuFilter>,
) -> Result<Json<Vec<menu_item::Model>>> {
    require_restaurant(&state.db, restaurant_id).await?;
    Ok(Json(list_menu(&state.db, restaurant_id, &filter).await?))
}

/// Body of `POST /api/menu-items`.
#[derive(Debug, Deserialize)]
pub struct NewMenuItem {
    /// Restaurant the item is added to
    pub restaurant_id: i64,
    /// Display name
    pub name: String,
    /// Price
    pub price: Decimal,
    /// Food or Drink
    #[serde(default)]
    pub category: Option<MenuCategory>,
    /// Defaults to available
    #[serde(default)]
    pub available: Option<bool>,
}

/// `POST /api/menu-items` (restaurant owner or admin)
pub async fn create_menu_item_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(body): JsonBody<NewMenuItem>,
) -> Result<(StatusCode, Json<menu_item::Model>)> {
    let input = MenuItemInput {
        name: body.name,
        price: body.price,
        category: body.category,
        available: body.available.unwrap_or(true),
    };
    let created = create_menu_item(&state.db, &actor, body.restaurant_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/menu-items/{id}` (restaurant owner or admin)
pub async fn update_menu_item_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(menu_item_id): PathParam<i64>,
    JsonBody(input): JsonBody<MenuItemInput>,
) -> Result<Json<menu_item::Model>> {
    Ok(Json(
        update_menu_item(&state.db, &actor, menu_item_id, input).await?,
    ))
}

/// `DELETE /api/menu-items/{id}` (restaurant owner or admin)
pub async fn delete_menu_item_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(menu_item_id): PathParam<i64>,
) -> Result<StatusCode> {
    delete_menu_item(&state.db, &actor, menu_item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
