//! Cart, checkout and order endpoints.

use super::{
    auth::CurrentUser,
    extract::{JsonBody, PathParam, QueryParams},
    state::AppState,
};
use crate::{
    core::{
        cart::{PricedCart, add_item, price_cart},
        order::{
            CheckoutInput, OrderDetail, OrderFilter, OrderSummary, cancel_order, checkout,
            list_orders, order_detail, transition_order,
        },
        user::require_role,
    },
    entities::{OrderStatus, UserRole, order, user},
    errors::Result,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

fn require_customer(actor: &user::Model) -> Result<()> {
    require_role(actor, UserRole::Customer, "use a cart")
}

/// `GET /api/cart`
pub async fn get_cart_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<PricedCart>> {
    require_customer(&actor)?;
    let cart = state.carts.get(actor.id).await;
    Ok(Json(price_cart(&state.db, &cart).await?))
}

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    /// Restaurant the item belongs to
    pub restaurant_id: i64,
    /// Item to add
    pub menu_item_id: i64,
    /// Defaults to 1
    #[serde(default = "one")]
    pub quantity: i64,
}

const fn one() -> i64 {
    1
}

/// `POST /api/cart/items`
pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(body): JsonBody<AddToCart>,
) -> Result<Json<PricedCart>> {
    require_customer(&actor)?;
    let mut cart = state.carts.lock(actor.id).await;
    add_item(
        &state.db,
        &mut cart,
        body.restaurant_id,
        body.menu_item_id,
        body.quantity,
    )
    .await?;
    Ok(Json(price_cart(&state.db, &cart).await?))
}

/// One line of `PUT /api/cart`.
#[derive(Debug, Deserialize)]
pub struct CartLineUpdate {
    /// Item in the cart
    pub menu_item_id: i64,
    /// New quantity; zero or less removes the line
    pub quantity: i64,
}

/// Body of `PUT /api/cart`.
#[derive(Debug, Deserialize)]
pub struct UpdateCart {
    /// Complete new set of lines
    pub items: Vec<CartLineUpdate>,
}

/// `PUT /api/cart`
pub async fn update_cart_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(body): JsonBody<UpdateCart>,
) -> Result<Json<PricedCart>> {
    require_customer(&actor)?;
    let mut cart = state.carts.lock(actor.id).await;
    cart.set_quantities(body.items.iter().map(|l| (l.menu_item_id, l.quantity)))?;
    Ok(Json(price_cart(&state.db, &cart).await?))
}

/// `DELETE /api/cart`
pub async fn clear_cart_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<StatusCode> {
    require_customer(&actor)?;
    state.carts.clear(actor.id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/orders?status=`, scoped to the caller's role
pub async fn list_orders_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    QueryParams(filter): QueryParams<OrderFilter>,
) -> Result<Json<Vec<OrderSummary>>> {
    Ok(Json(list_orders(&state.db, &actor, &filter).await?))
}

/// `POST /api/orders` checks out the caller's cart.
pub async fn checkout_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(input): JsonBody<CheckoutInput>,
) -> Result<(StatusCode, Json<order::Model>)> {
    let mut cart = state.carts.lock(actor.id).await;
    let placed = checkout(&state.db, &actor, &mut cart, input).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// `GET /api/orders/{id}`
pub async fn order_detail_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(order_id): PathParam<i64>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(order_detail(&state.db, &actor, order_id).await?))
}

/// Body of `POST /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    /// Target status label, e.g. `"Out for Delivery"`
    pub status: String,
    /// History note
    #[serde(default)]
    pub note: Option<String>,
}

/// `POST /api/orders/{id}/status`
pub async fn change_status_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(order_id): PathParam<i64>,
    JsonBody(body): JsonBody<StatusChange>,
) -> Result<Json<order::Model>> {
    let to: OrderStatus = body.status.parse()?;
    Ok(Json(
        transition_order(&state.db, &actor, order_id, to, body.note).await?,
    ))
}

/// Body of `POST /api/orders/{id}/cancel`.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    /// Reason, logged in the history
    #[serde(default)]
    pub note: Option<String>,
}

/// `POST /api/orders/{id}/cancel`; the body is optional.
pub async fn cancel_order_handler(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PathParam(order_id): PathParam<i64>,
    body: Option<JsonBody<CancelRequest>>,
) -> Result<Json<order::Model>> {
    let note = body.and_then(|JsonBody(body)| body.note);
    Ok(Json(cancel_order(&state.db, &actor, order_id, note).await?))
}
