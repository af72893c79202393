//! Order lifecycle - the single transition table every status change goes through.
//!
//! Orders move forward along Placed → Accepted → Preparing → Out for Delivery →
//! Delivered and may be cancelled while still early. Handlers never write the
//! `status` column directly; they call [`apply_transition`], which checks the
//! table, stamps the stage timestamp and appends a history row in the caller's
//! database transaction.

use crate::{
    entities::{OrderStatus, OrderStatusHistory, UserRole, order, order_status_history},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Returns whether an order in `from` may move to `to`.
///
/// Rules:
/// - nothing leaves `Delivered` or `Cancelled`
/// - `Cancelled` is only reachable from `Placed` and `Accepted`
/// - `Delivered` is only reachable from `Out for Delivery`
/// - every other move must go strictly forward; skipping stages is allowed
#[must_use]
pub const fn is_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    if from.is_terminal() {
        return false;
    }
    match to {
        OrderStatus::Cancelled => matches!(from, OrderStatus::Placed | OrderStatus::Accepted),
        OrderStatus::Delivered => matches!(from, OrderStatus::OutForDelivery),
        _ => to.rank() > from.rank(),
    }
}

/// Like [`is_allowed`], but as an error suitable for returning to the caller.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition { from, to })
    }
}

/// Target statuses each role may drive.
///
/// Ownership (my restaurant, my order, my delivery) is checked separately by
/// the operation that performs the change.
#[must_use]
pub const fn role_may_set(role: UserRole, to: OrderStatus) -> bool {
    match role {
        UserRole::Admin => true,
        UserRole::RestaurantOwner => matches!(
            to,
            OrderStatus::Accepted | OrderStatus::Preparing | OrderStatus::Cancelled
        ),
        UserRole::DeliveryAgent => {
            matches!(to, OrderStatus::OutForDelivery | OrderStatus::Delivered)
        }
        UserRole::Customer => matches!(to, OrderStatus::Cancelled),
    }
}

/// History note used when the caller does not supply one.
#[must_use]
pub const fn default_note(role: UserRole, to: OrderStatus) -> &'static str {
    match (role, to) {
        (UserRole::Customer, OrderStatus::Placed) => "Order placed by customer",
        (UserRole::Customer, _) => "Cancelled by customer",
        (UserRole::RestaurantOwner, OrderStatus::Cancelled) => "Rejected by restaurant owner",
        (UserRole::RestaurantOwner, _) => "Updated by restaurant owner",
        (UserRole::DeliveryAgent, OrderStatus::Delivered) => "Delivered by agent",
        (UserRole::DeliveryAgent, _) => "Picked up by agent",
        (UserRole::Admin, _) => "Updated by admin",
    }
}

/// Moves `order` to `to`, stamping the stage timestamp and logging history.
///
/// Must be called inside the transaction that owns the rest of the request's
/// writes so that the status, timestamp and history row commit together.
pub async fn apply_transition<C>(
    conn: &C,
    order: order::Model,
    to: OrderStatus,
    actor_user_id: Option<i64>,
    note: Option<String>,
) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let from = order.status;
    check_transition(from, to)?;

    let now = chrono::Utc::now();
    let order_id = order.id;
    let mut active: order::ActiveModel = order.into();
    active.status = Set(to);
    match to {
        OrderStatus::Placed => active.placed_at = Set(now),
        OrderStatus::Accepted => active.accepted_at = Set(Some(now)),
        OrderStatus::Preparing => active.preparing_at = Set(Some(now)),
        OrderStatus::OutForDelivery => active.out_for_delivery_at = Set(Some(now)),
        OrderStatus::Delivered => active.delivered_at = Set(Some(now)),
        OrderStatus::Cancelled => active.cancelled_at = Set(Some(now)),
    }
    let updated = active.update(conn).await?;

    log_history(conn, order_id, to, actor_user_id, note).await?;
    info!(
        "Order {} moved from {} to {} (actor: {:?})",
        order_id, from, to, actor_user_id
    );
    Ok(updated)
}

/// Appends a row to the order's status history.
pub async fn log_history<C>(
    conn: &C,
    order_id: i64,
    status: OrderStatus,
    actor_user_id: Option<i64>,
    note: Option<String>,
) -> Result<order_status_history::Model>
where
    C: ConnectionTrait,
{
    let row = order_status_history::ActiveModel {
        order_id: Set(order_id),
        status: Set(status),
        actor_user_id: Set(actor_user_id),
        note: Set(note),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    row.insert(conn).await.map_err(Into::into)
}

/// Status history of an order, oldest first.
pub async fn order_history<C>(conn: &C, order_id: i64) -> Result<Vec<order_status_history::Model>>
where
    C: ConnectionTrait,
{
    OrderStatusHistory::find()
        .filter(order_status_history::Column::OrderId.eq(order_id))
        .order_by_asc(order_status_history::Column::CreatedAt)
        .order_by_asc(order_status_history::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}
