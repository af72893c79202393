//! Order business logic - checkout, role-scoped order views and status changes.
//!
//! Checkout turns a [`Cart`] into an order in one database transaction: the
//! order row, one line per valid cart entry with the menu price captured at
//! that moment, and the initial `Placed` history row. The cart is cleared only
//! after the commit succeeds. Status changes go through
//! [`lifecycle::apply_transition`] so legality, timestamps and history are
//! handled in one place.

use super::{
    cart::Cart,
    delivery,
    eta::{Eta, estimate_eta},
    lifecycle, trimmed_or_none,
    user::require_role,
};
use crate::{
    entities::{
        DeliveryAssignmentModel, DeliveryLocationModel, MenuItem, Order, OrderItem, OrderStatus,
        PaymentMethod, RestaurantStatus, UserRole, order, order_item, order_status_history,
        restaurant, user,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

const OWNER_ORDER_LIMIT: u64 = 100;
const STAFF_ORDER_LIMIT: u64 = 50;

/// Payment details supplied at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    /// COD or Online
    pub payment_method: PaymentMethod,
    /// Free-form note for the agent
    #[serde(default)]
    pub delivery_instructions: Option<String>,
}

/// Places an order from the customer's cart.
///
/// Lines whose item vanished, moved to another restaurant or became
/// unavailable are skipped. If no line survives, nothing is written and
/// [`Error::NoValidItems`] is returned. On success the cart is emptied.
pub async fn checkout(
    db: &DatabaseConnection,
    customer: &user::Model,
    cart: &mut Cart,
    input: CheckoutInput,
) -> Result<order::Model> {
    require_role(customer, UserRole::Customer, "place orders")?;
    let restaurant_id = match cart.restaurant_id {
        Some(id) if !cart.items.is_empty() => id,
        _ => return Err(Error::EmptyCart),
    };

    let txn = db.begin().await?;

    let restaurant = super::restaurant::require_restaurant(&txn, restaurant_id).await?;
    if restaurant.status != RestaurantStatus::Active {
        return Err(Error::RestaurantInactive { id: restaurant_id });
    }

    let placed = order::ActiveModel {
        user_id: Set(customer.id),
        restaurant_id: Set(restaurant.id),
        status: Set(OrderStatus::Placed),
        payment_method: Set(input.payment_method),
        delivery_instructions: Set(trimmed_or_none(input.delivery_instructions)),
        placed_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut added = 0_usize;
    for (&menu_item_id, &quantity) in &cart.items {
        let Some(item) = MenuItem::find_by_id(menu_item_id).one(&txn).await? else {
            warn!("Skipping vanished menu item {} at checkout", menu_item_id);
            continue;
        };
        if item.restaurant_id != restaurant.id || !item.available {
            warn!(
                "Skipping menu item {} at checkout (restaurant {}, available {})",
                item.id, item.restaurant_id, item.available
            );
            continue;
        }
        let quantity = i32::try_from(quantity).map_err(|_| Error::InvalidQuantity {
            quantity: i64::from(quantity),
        })?;

        order_item::ActiveModel {
            order_id: Set(placed.id),
            menu_item_id: Set(item.id),
            quantity: Set(quantity),
            price_at_purchase: Set(item.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        added += 1;
    }

    if added == 0 {
        return Err(Error::NoValidItems);
    }

    lifecycle::log_history(
        &txn,
        placed.id,
        OrderStatus::Placed,
        Some(customer.id),
        Some(lifecycle::default_note(UserRole::Customer, OrderStatus::Placed).to_string()),
    )
    .await?;

    txn.commit().await?;
    cart.clear();

    info!(
        "Customer {} placed order {} at restaurant {} with {} lines",
        customer.id, placed.id, restaurant.id, added
    );
    Ok(placed)
}

/// Finds an order by id.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Finds an order by id, failing with [`Error::NotFound`].
pub async fn require_order<C>(conn: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Order", order_id))
}

/// The lines of an order in insertion order.
pub async fn order_items<C>(conn: &C, order_id: i64) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Sum of `price_at_purchase × quantity` over the lines.
#[must_use]
pub fn items_total(items: &[order_item::Model]) -> Decimal {
    items
        .iter()
        .map(|item| item.price_at_purchase * Decimal::from(item.quantity))
        .sum()
}

/// Total of an order at the prices captured when it was placed.
pub async fn order_total(db: &DatabaseConnection, order_id: i64) -> Result<Decimal> {
    require_order(db, order_id).await?;
    Ok(items_total(&order_items(db, order_id).await?))
}

/// Formats an amount with exactly two decimals, e.g. `1197.00`.
#[must_use]
pub fn money_str(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// An order with its lines and total.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    /// The order row
    #[serde(flatten)]
    pub order: order::Model,
    /// Its lines
    pub items: Vec<order_item::Model>,
    /// Captured-price total
    pub total: Decimal,
}

/// Everything a tracking page shows about one order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    /// The order row
    #[serde(flatten)]
    pub order: order::Model,
    /// Fulfilling restaurant
    pub restaurant: restaurant::Model,
    /// Its lines
    pub items: Vec<order_item::Model>,
    /// Captured-price total
    pub total: Decimal,
    /// Advisory arrival estimate
    pub eta: Eta,
    /// Status history, oldest first
    pub history: Vec<order_status_history::Model>,
    /// Delivery assignment, if any
    pub delivery: Option<DeliveryAssignmentModel>,
    /// Most recent agent location, if any
    pub last_location: Option<DeliveryLocationModel>,
}

/// Fails with [`Error::Forbidden`] unless `viewer` may see `order`.
///
/// Customers see their own orders, owners the orders of their restaurants,
/// agents the orders assigned to them, admins everything.
async fn ensure_can_view<C>(
    conn: &C,
    viewer: &user::Model,
    order: &order::Model,
    delivery: Option<&DeliveryAssignmentModel>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let allowed = match viewer.role {
        UserRole::Admin => true,
        UserRole::Customer => order.user_id == viewer.id,
        UserRole::RestaurantOwner => {
            let restaurant = super::restaurant::require_restaurant(conn, order.restaurant_id).await?;
            restaurant.owner_id == Some(viewer.id)
        }
        UserRole::DeliveryAgent => delivery.is_some_and(|d| d.delivery_agent_id == viewer.id),
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::forbidden(viewer.role, format!("view order {}", order.id)))
    }
}

/// Loads the full tracking view of an order for `viewer`.
pub async fn order_detail(
    db: &DatabaseConnection,
    viewer: &user::Model,
    order_id: i64,
) -> Result<OrderDetail> {
    let order = require_order(db, order_id).await?;
    let delivery = delivery::delivery_for_order(db, order_id).await?;
    ensure_can_view(db, viewer, &order, delivery.as_ref()).await?;

    let restaurant = super::restaurant::require_restaurant(db, order.restaurant_id).await?;
    let items = order_items(db, order_id).await?;
    let total = items_total(&items);
    let history = lifecycle::order_history(db, order_id).await?;
    let last_location = match &delivery {
        Some(d) => delivery::latest_location(db, d.id).await?,
        None => None,
    };
    let eta = estimate_eta(&order, delivery.as_ref(), chrono::Utc::now());

    Ok(OrderDetail {
        order,
        restaurant,
        items,
        total,
        eta,
        history,
        delivery,
        last_location,
    })
}

/// Order listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Only orders currently in this status
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Orders visible to `viewer`, newest first, each with lines and total.
///
/// Customers get all of their orders; owners the latest 100 across their
/// restaurants; agents and admins the latest 50.
pub async fn list_orders(
    db: &DatabaseConnection,
    viewer: &user::Model,
    filter: &OrderFilter,
) -> Result<Vec<OrderSummary>> {
    let mut query = Order::find();
    match viewer.role {
        UserRole::Customer => {
            query = query.filter(order::Column::UserId.eq(viewer.id));
        }
        UserRole::RestaurantOwner => {
            let ids: Vec<i64> = super::restaurant::restaurants_for_owner(db, viewer.id)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query
                .filter(order::Column::RestaurantId.is_in(ids))
                .limit(OWNER_ORDER_LIMIT);
        }
        UserRole::DeliveryAgent => {
            let ids: Vec<i64> = delivery::deliveries_for_agent(db, viewer.id)
                .await?
                .into_iter()
                .map(|d| d.order_id)
                .collect();
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query
                .filter(order::Column::Id.is_in(ids))
                .limit(STAFF_ORDER_LIMIT);
        }
        UserRole::Admin => {
            query = query.limit(STAFF_ORDER_LIMIT);
        }
    }
    if let Some(status) = filter.status {
        query = query.filter(order::Column::Status.eq(status));
    }

    let orders = query.order_by_desc(order::Column::Id).all(db).await?;
    summarize(db, orders).await
}

async fn summarize(db: &DatabaseConnection, orders: Vec<order::Model>) -> Result<Vec<OrderSummary>> {
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut lines: HashMap<i64, Vec<order_item::Model>> = HashMap::new();
    if !ids.is_empty() {
        for item in OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(ids))
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?
        {
            lines.entry(item.order_id).or_default().push(item);
        }
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = lines.remove(&order.id).unwrap_or_default();
            let total = items_total(&items);
            OrderSummary {
                order,
                items,
                total,
            }
        })
        .collect())
}

/// Moves an order to `to` on behalf of `actor`.
///
/// The role must be allowed to drive `to` ([`lifecycle::role_may_set`]) and
/// must own the order: owners their restaurant's orders, customers their own
/// orders. Agents, and any move to `Out for Delivery` or `Delivered`, go
/// through the order's delivery assignment ([`delivery::advance_order`]) so
/// the assignment status stays in step. When `note` is blank a role-specific
/// default is logged.
pub async fn transition_order(
    db: &DatabaseConnection,
    actor: &user::Model,
    order_id: i64,
    to: OrderStatus,
    note: Option<String>,
) -> Result<order::Model> {
    if !lifecycle::role_may_set(actor.role, to) {
        warn!("{} {} tried to set order {} to {}", actor.role, actor.id, order_id, to);
        return Err(Error::forbidden(actor.role, format!("set orders to {to}")));
    }
    if actor.role == UserRole::DeliveryAgent
        || matches!(to, OrderStatus::OutForDelivery | OrderStatus::Delivered)
    {
        return delivery::advance_order(db, actor, order_id, to, note).await;
    }

    let txn = db.begin().await?;
    let order = require_order(&txn, order_id).await?;

    match actor.role {
        UserRole::RestaurantOwner => {
            let restaurant = super::restaurant::require_restaurant(&txn, order.restaurant_id).await?;
            super::restaurant::ensure_manages(actor, &restaurant)?;
        }
        UserRole::Customer if order.user_id != actor.id => {
            return Err(Error::forbidden(actor.role, format!("change order {order_id}")));
        }
        _ => {}
    }

    let note = trimmed_or_none(note)
        .unwrap_or_else(|| lifecycle::default_note(actor.role, to).to_string());
    let updated = lifecycle::apply_transition(&txn, order, to, Some(actor.id), Some(note)).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Restaurant-owner status update: only `Accepted` and `Preparing` are accepted here.
pub async fn owner_update_status(
    db: &DatabaseConnection,
    owner: &user::Model,
    order_id: i64,
    to: OrderStatus,
) -> Result<order::Model> {
    require_role(owner, UserRole::RestaurantOwner, "update restaurant orders")?;
    if !matches!(to, OrderStatus::Accepted | OrderStatus::Preparing) {
        return Err(Error::validation(format!(
            "Owners may set Accepted or Preparing, not {to}"
        )));
    }
    transition_order(db, owner, order_id, to, None).await
}

/// Cancels (customer, admin) or rejects (owner) an order.
pub async fn cancel_order(
    db: &DatabaseConnection,
    actor: &user::Model,
    order_id: i64,
    note: Option<String>,
) -> Result<order::Model> {
    transition_order(db, actor, order_id, OrderStatus::Cancelled, note).await
}
