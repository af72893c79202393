//! Delivery assignment entity - Links an order to the agent delivering it.
//!
//! `order_id` carries a unique constraint: an order has at most one assignment row,
//! and reassigning an order updates that row in place.

use super::status::DeliveryStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery assignment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_assignments")]
pub struct Model {
    /// Unique identifier for the delivery
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order being delivered
    #[sea_orm(unique)]
    pub order_id: i64,
    /// Agent responsible for the delivery
    pub delivery_agent_id: i64,
    /// Assigned, Pickup or Dropped
    pub status: DeliveryStatus,
    /// When the agent was (last) assigned
    pub assigned_at: DateTimeUtc,
    /// When the agent picked the order up
    pub pickup_at: Option<DateTimeUtc>,
    /// When the agent dropped the order off
    pub dropped_at: Option<DateTimeUtc>,
    /// Admin-provided delivery estimate, preferred by the ETA display
    pub expected_drop_at: Option<DateTimeUtc>,
}

/// Defines relationships between DeliveryAssignment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each assignment belongs to one agent
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DeliveryAgentId",
        to = "super::user::Column::Id"
    )]
    Agent,
    /// Location pings recorded during the delivery
    #[sea_orm(has_many = "super::delivery_location::Entity")]
    Locations,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl Related<super::delivery_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
