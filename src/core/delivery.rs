//! Delivery assignment and the agent side of fulfilment.
//!
//! An admin assigns an agent to an order (one assignment row per order,
//! reassignable until pickup). The agent then picks the order up and drops it
//! off; each step moves the order through [`lifecycle::apply_transition`] in the
//! same transaction as the assignment update, so the two never disagree.

use super::{
    lifecycle,
    order::require_order,
    trimmed_or_none,
    user::{require_role, require_user},
};
use crate::{
    entities::{
        DeliveryAssignment, DeliveryLocation, DeliveryStatus, OrderStatus, UserRole,
        delivery_assignment, delivery_location, order, user,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const AGENT_DELIVERY_LIMIT: u64 = 50;

/// Admin request to put an agent on an order.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignDelivery {
    /// Order to deliver
    pub order_id: i64,
    /// Agent who delivers it
    pub delivery_agent_id: i64,
    /// Optional estimate shown as the ETA
    #[serde(default)]
    pub expected_drop_at: Option<DateTime<Utc>>,
}

/// Assigns (or reassigns) a delivery agent to an order.
///
/// An order never gets a second assignment row: if one exists and the agent
/// has not picked up yet, it is updated in place. Once picked up, reassignment
/// fails with [`Error::InvalidDeliveryState`].
pub async fn assign_delivery(
    db: &DatabaseConnection,
    admin: &user::Model,
    request: AssignDelivery,
) -> Result<delivery_assignment::Model> {
    require_role(admin, UserRole::Admin, "assign deliveries")?;

    let txn = db.begin().await?;

    let order = require_order(&txn, request.order_id).await?;
    if order.status.is_terminal() {
        return Err(Error::validation(format!(
            "Order {} is already {}",
            order.id, order.status
        )));
    }
    let agent = require_user(&txn, request.delivery_agent_id).await?;
    if agent.role != UserRole::DeliveryAgent {
        return Err(Error::validation(format!(
            "User {} is not a Delivery Agent",
            agent.id
        )));
    }

    let now = Utc::now();
    let assignment = match delivery_for_order(&txn, order.id).await? {
        Some(existing) => {
            if existing.status != DeliveryStatus::Assigned {
                return Err(Error::InvalidDeliveryState {
                    current: existing.status,
                    expected: DeliveryStatus::Assigned,
                });
            }
            let previous_agent = existing.delivery_agent_id;
            let mut active: delivery_assignment::ActiveModel = existing.into();
            active.delivery_agent_id = Set(agent.id);
            active.expected_drop_at = Set(request.expected_drop_at);
            active.assigned_at = Set(now);
            let updated = active.update(&txn).await?;
            info!(
                "Reassigned order {} from agent {} to agent {}",
                order.id, previous_agent, agent.id
            );
            updated
        }
        None => {
            let created = delivery_assignment::ActiveModel {
                order_id: Set(order.id),
                delivery_agent_id: Set(agent.id),
                status: Set(DeliveryStatus::Assigned),
                assigned_at: Set(now),
                expected_drop_at: Set(request.expected_drop_at),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            info!("Assigned order {} to agent {}", order.id, agent.id);
            created
        }
    };

    txn.commit().await?;
    Ok(assignment)
}

/// The assignment of an order, if it has one.
pub async fn delivery_for_order<C>(
    conn: &C,
    order_id: i64,
) -> Result<Option<delivery_assignment::Model>>
where
    C: ConnectionTrait,
{
    DeliveryAssignment::find()
        .filter(delivery_assignment::Column::OrderId.eq(order_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Finds an assignment by id, failing with [`Error::NotFound`].
pub async fn require_delivery<C>(conn: &C, delivery_id: i64) -> Result<delivery_assignment::Model>
where
    C: ConnectionTrait,
{
    DeliveryAssignment::find_by_id(delivery_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Delivery", delivery_id))
}

/// An agent's latest 50 assignments, newest first.
pub async fn deliveries_for_agent(
    db: &DatabaseConnection,
    agent_id: i64,
) -> Result<Vec<delivery_assignment::Model>> {
    DeliveryAssignment::find()
        .filter(delivery_assignment::Column::DeliveryAgentId.eq(agent_id))
        .order_by_desc(delivery_assignment::Column::Id)
        .limit(AGENT_DELIVERY_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Step an agent takes on an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryAction {
    /// Collect the order from the restaurant
    Pickup,
    /// Hand the order to the customer
    Drop,
}

impl DeliveryAction {
    /// Delivery status the action starts from, the one it ends in, and the
    /// order status it drives.
    const fn plan(self) -> (DeliveryStatus, DeliveryStatus, OrderStatus) {
        match self {
            Self::Pickup => (
                DeliveryStatus::Assigned,
                DeliveryStatus::Pickup,
                OrderStatus::OutForDelivery,
            ),
            Self::Drop => (
                DeliveryStatus::Pickup,
                DeliveryStatus::Dropped,
                OrderStatus::Delivered,
            ),
        }
    }
}

/// An assignment together with the order it moved.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryUpdate {
    /// Updated assignment
    pub delivery: delivery_assignment::Model,
    /// Updated order
    pub order: order::Model,
}

fn ensure_assigned(agent: &user::Model, delivery: &delivery_assignment::Model) -> Result<()> {
    if delivery.delivery_agent_id == agent.id {
        Ok(())
    } else {
        Err(Error::forbidden(
            agent.role,
            format!("update delivery {} assigned to another agent", delivery.id),
        ))
    }
}

async fn advance<C>(
    conn: &C,
    actor: &user::Model,
    delivery: delivery_assignment::Model,
    action: DeliveryAction,
    note: Option<String>,
) -> Result<DeliveryUpdate>
where
    C: ConnectionTrait,
{
    let (expected, next, to) = action.plan();
    if delivery.status != expected {
        return Err(Error::InvalidDeliveryState {
            current: delivery.status,
            expected,
        });
    }

    let order = require_order(conn, delivery.order_id).await?;
    let note = trimmed_or_none(note)
        .unwrap_or_else(|| lifecycle::default_note(actor.role, to).to_string());
    let order = lifecycle::apply_transition(conn, order, to, Some(actor.id), Some(note)).await?;

    let now = Utc::now();
    let mut active: delivery_assignment::ActiveModel = delivery.into();
    active.status = Set(next);
    match action {
        DeliveryAction::Pickup => active.pickup_at = Set(Some(now)),
        DeliveryAction::Drop => active.dropped_at = Set(Some(now)),
    }
    let delivery = active.update(conn).await?;

    info!(
        "{} {} moved delivery {} to {:?} (order {} now {})",
        actor.role, actor.id, delivery.id, delivery.status, order.id, order.status
    );
    Ok(DeliveryUpdate { delivery, order })
}

/// Picks up or drops off a delivery on behalf of its assigned agent.
pub async fn update_delivery(
    db: &DatabaseConnection,
    agent: &user::Model,
    delivery_id: i64,
    action: DeliveryAction,
) -> Result<DeliveryUpdate> {
    require_role(agent, UserRole::DeliveryAgent, "update deliveries")?;

    let txn = db.begin().await?;
    let delivery = require_delivery(&txn, delivery_id).await?;
    ensure_assigned(agent, &delivery)?;
    let update = advance(&txn, agent, delivery, action, None).await?;
    txn.commit().await?;
    Ok(update)
}

/// Marks a delivery as picked up; the order moves to `Out for Delivery`.
pub async fn pickup(
    db: &DatabaseConnection,
    agent: &user::Model,
    delivery_id: i64,
) -> Result<DeliveryUpdate> {
    update_delivery(db, agent, delivery_id, DeliveryAction::Pickup).await
}

/// Marks a picked-up delivery as dropped; the order moves to `Delivered`.
pub async fn drop_off(
    db: &DatabaseConnection,
    agent: &user::Model,
    delivery_id: i64,
) -> Result<DeliveryUpdate> {
    update_delivery(db, agent, delivery_id, DeliveryAction::Drop).await
}

/// Order-level entry point for the delivery stages: `Out for Delivery` is a
/// pickup and `Delivered` a drop, applied to the order's assignment.
///
/// Agents may only move their own assignments. Admins may move any, but the
/// order must have an assignment so that it and the order stay in step.
pub async fn advance_order(
    db: &DatabaseConnection,
    actor: &user::Model,
    order_id: i64,
    to: OrderStatus,
    note: Option<String>,
) -> Result<order::Model> {
    if !matches!(actor.role, UserRole::DeliveryAgent | UserRole::Admin) {
        return Err(Error::forbidden(actor.role, "update deliveries"));
    }
    let action = match to {
        OrderStatus::OutForDelivery => DeliveryAction::Pickup,
        OrderStatus::Delivered => DeliveryAction::Drop,
        _ => return Err(Error::forbidden(actor.role, format!("set orders to {to} via a delivery"))),
    };

    let txn = db.begin().await?;
    require_order(&txn, order_id).await?;
    let delivery = match delivery_for_order(&txn, order_id).await? {
        Some(delivery) => delivery,
        None if actor.role == UserRole::Admin => {
            return Err(Error::validation(format!(
                "Order {order_id} has no delivery assignment"
            )));
        }
        None => {
            return Err(Error::forbidden(
                actor.role,
                format!("update unassigned order {order_id}"),
            ));
        }
    };
    if actor.role == UserRole::DeliveryAgent {
        ensure_assigned(actor, &delivery)?;
    }
    let update = advance(&txn, actor, delivery, action, note).await?;
    txn.commit().await?;
    Ok(update.order)
}

/// A position report from an agent.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationPing {
    /// Latitude in degrees, -90 to 90
    pub lat: f64,
    /// Longitude in degrees, -180 to 180
    pub lng: f64,
    /// Optional note
    #[serde(default)]
    pub note: Option<String>,
}

/// Records a location ping for a delivery assigned to `agent`.
pub async fn record_location(
    db: &DatabaseConnection,
    agent: &user::Model,
    delivery_id: i64,
    ping: LocationPing,
) -> Result<delivery_location::Model> {
    require_role(agent, UserRole::DeliveryAgent, "send location updates")?;
    if !(-90.0..=90.0).contains(&ping.lat) || !(-180.0..=180.0).contains(&ping.lng) {
        return Err(Error::validation(format!(
            "Invalid coordinates ({}, {})",
            ping.lat, ping.lng
        )));
    }

    let delivery = require_delivery(db, delivery_id).await?;
    ensure_assigned(agent, &delivery)?;

    let row = delivery_location::ActiveModel {
        delivery_id: Set(delivery.id),
        lat: Set(ping.lat),
        lng: Set(ping.lng),
        note: Set(trimmed_or_none(ping.note)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(
        "Delivery {} at ({}, {})",
        delivery.id, row.lat, row.lng
    );
    Ok(row)
}

/// Most recent location ping of a delivery.
pub async fn latest_location<C>(
    conn: &C,
    delivery_id: i64,
) -> Result<Option<delivery_location::Model>>
where
    C: ConnectionTrait,
{
    DeliveryLocation::find()
        .filter(delivery_location::Column::DeliveryId.eq(delivery_id))
        .order_by_desc(delivery_location::Column::CreatedAt)
        .order_by_desc(delivery_location::Column::Id)
        .one(conn)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::order::{cancel_order, order_detail, owner_update_status, transition_order};
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    fn assign(order_id: i64, agent_id: i64) -> AssignDelivery {
        AssignDelivery {
            order_id,
            delivery_agent_id: agent_id,
            expected_drop_at: None,
        }
    }

    #[tokio::test]
    async fn test_full_delivery_flow() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;

        owner_update_status(db, &fixture.owner, fixture.order.id, OrderStatus::Accepted).await?;
        owner_update_status(db, &fixture.owner, fixture.order.id, OrderStatus::Preparing).await?;
        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;
        assert_eq!(delivery.status, DeliveryStatus::Assigned);

        let picked = pickup(db, &fixture.agent, delivery.id).await?;
        assert_eq!(picked.delivery.status, DeliveryStatus::Pickup);
        assert!(picked.delivery.pickup_at.is_some());
        assert_eq!(picked.order.status, OrderStatus::OutForDelivery);

        let dropped = drop_off(db, &fixture.agent, delivery.id).await?;
        assert_eq!(dropped.delivery.status, DeliveryStatus::Dropped);
        assert!(dropped.delivery.dropped_at.is_some());
        assert_eq!(dropped.order.status, OrderStatus::Delivered);
        assert!(dropped.order.delivered_at.is_some());

        let history = lifecycle::order_history(db, fixture.order.id).await?;
        let statuses: Vec<OrderStatus> = history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Placed,
                OrderStatus::Accepted,
                OrderStatus::Preparing,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered,
            ]
        );
        assert_eq!(history[3].note.as_deref(), Some("Picked up by agent"));
        assert_eq!(history[4].note.as_deref(), Some("Delivered by agent"));

        let detail = order_detail(db, &fixture.customer, fixture.order.id).await?;
        assert_eq!(detail.eta.detail, "—");
        Ok(())
    }

    #[tokio::test]
    async fn test_reassignment_updates_the_single_row() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let second = create_test_user(db, "Agent 2", UserRole::DeliveryAgent).await?;

        let first = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;
        let again = assign_delivery(db, &fixture.admin, assign(fixture.order.id, second.id)).await?;

        assert_eq!(first.id, again.id);
        assert_eq!(again.delivery_agent_id, second.id);
        assert_eq!(DeliveryAssignment::find().count(db).await?, 1);
        assert!(deliveries_for_agent(db, fixture.agent.id).await?.is_empty());
        assert_eq!(deliveries_for_agent(db, second.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reassignment_after_pickup_is_rejected() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let second = create_test_user(db, "Agent 2", UserRole::DeliveryAgent).await?;

        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;
        update_delivery(db, &fixture.agent, delivery.id, DeliveryAction::Pickup).await?;

        let result = assign_delivery(db, &fixture.admin, assign(fixture.order.id, second.id)).await;
        assert!(matches!(
            result,
            Err(Error::InvalidDeliveryState {
                current: DeliveryStatus::Pickup,
                expected: DeliveryStatus::Assigned
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_validation() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;

        let result = assign_delivery(db, &fixture.owner, assign(fixture.order.id, fixture.agent.id)).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let result = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.customer.id)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = assign_delivery(db, &fixture.admin, assign(9999, fixture.agent.id)).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Order", .. })));

        cancel_order(db, &fixture.customer, fixture.order.id, None).await?;
        let result = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(DeliveryAssignment::find().count(db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_drop_before_pickup_is_rejected() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;

        let result = update_delivery(db, &fixture.agent, delivery.id, DeliveryAction::Drop).await;
        assert!(matches!(result, Err(Error::InvalidDeliveryState { .. })));
        assert_eq!(
            require_order(db, fixture.order.id).await?.status,
            OrderStatus::Placed
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_other_agent_cannot_act() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let other = create_test_user(db, "Agent 2", UserRole::DeliveryAgent).await?;
        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;

        let result = update_delivery(db, &other, delivery.id, DeliveryAction::Pickup).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let ping = LocationPing {
            lat: 12.97,
            lng: 77.59,
            note: None,
        };
        let result = record_location(db, &other, delivery.id, ping).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_agent_status_change_goes_through_delivery() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;

        let result = transition_order(
            db,
            &fixture.agent,
            fixture.order.id,
            OrderStatus::OutForDelivery,
            None,
        )
        .await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;
        let order = transition_order(
            db,
            &fixture.agent,
            fixture.order.id,
            OrderStatus::OutForDelivery,
            None,
        )
        .await?;
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(
            require_delivery(db, delivery.id).await?.status,
            DeliveryStatus::Pickup
        );

        let result = transition_order(db, &fixture.agent, fixture.order.id, OrderStatus::Accepted, None).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_delivery_stages_move_the_assignment() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let order_id = fixture.order.id;

        let result = transition_order(db, &fixture.admin, order_id, OrderStatus::OutForDelivery, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(require_order(db, order_id).await?.status, OrderStatus::Placed);

        let delivery = assign_delivery(db, &fixture.admin, assign(order_id, fixture.agent.id)).await?;
        let order = transition_order(db, &fixture.admin, order_id, OrderStatus::OutForDelivery, None).await?;
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(require_delivery(db, delivery.id).await?.status, DeliveryStatus::Pickup);

        let result = pickup(db, &fixture.agent, delivery.id).await;
        assert!(matches!(result, Err(Error::InvalidDeliveryState { .. })));

        let dropped = drop_off(db, &fixture.agent, delivery.id).await?;
        assert_eq!(dropped.order.status, OrderStatus::Delivered);
        assert_eq!(dropped.delivery.status, DeliveryStatus::Dropped);

        let history = lifecycle::order_history(db, order_id).await?;
        let admin_row = history
            .iter()
            .find(|row| row.status == OrderStatus::OutForDelivery)
            .unwrap();
        assert_eq!(admin_row.actor_user_id, Some(fixture.admin.id));
        assert_eq!(admin_row.note.as_deref(), Some("Updated by admin"));
        Ok(())
    }

    #[tokio::test]
    async fn test_pickup_of_cancelled_order_fails_atomically() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;
        cancel_order(db, &fixture.customer, fixture.order.id, None).await?;

        let result = update_delivery(db, &fixture.agent, delivery.id, DeliveryAction::Pickup).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        assert_eq!(
            require_delivery(db, delivery.id).await?.status,
            DeliveryStatus::Assigned
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_location_pings() -> Result<()> {
        let fixture = setup_with_order().await?;
        let db = &fixture.db;
        let delivery = assign_delivery(db, &fixture.admin, assign(fixture.order.id, fixture.agent.id)).await?;
        assert!(latest_location(db, delivery.id).await?.is_none());

        let bad = LocationPing {
            lat: 91.0,
            lng: 0.0,
            note: None,
        };
        assert!(matches!(
            record_location(db, &fixture.agent, delivery.id, bad).await,
            Err(Error::Validation { .. })
        ));

        for (lat, lng) in [(12.9716, 77.5946), (12.9720, 77.5950)] {
            let ping = LocationPing {
                lat,
                lng,
                note: Some(" near gate ".to_string()),
            };
            record_location(db, &fixture.agent, delivery.id, ping).await?;
        }
        let latest = latest_location(db, delivery.id).await?.unwrap();
        assert!((latest.lat - 12.9720).abs() < f64::EPSILON);
        assert_eq!(latest.note.as_deref(), Some("near gate"));

        let detail = order_detail(db, &fixture.agent, fixture.order.id).await?;
        assert_eq!(detail.last_location.map(|l| l.id), Some(latest.id));
        Ok(())
    }
}
