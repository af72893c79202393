//! Order entity - A placed order and the timestamp of every lifecycle stage it reached.
//!
//! Each stage column is written exactly once, by the transition that enters that stage.

use super::status::{OrderStatus, PaymentMethod};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who placed the order
    pub user_id: i64,
    /// Restaurant fulfilling the order
    pub restaurant_id: i64,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// COD or Online
    pub payment_method: PaymentMethod,
    /// Free-form instructions for the agent
    pub delivery_instructions: Option<String>,
    /// Checkout time
    pub placed_at: DateTimeUtc,
    /// Set when the order enters `Accepted`
    pub accepted_at: Option<DateTimeUtc>,
    /// Set when the order enters `Preparing`
    pub preparing_at: Option<DateTimeUtc>,
    /// Set when the order enters `Out for Delivery`
    pub out_for_delivery_at: Option<DateTimeUtc>,
    /// Set when the order enters `Delivered`
    pub delivered_at: Option<DateTimeUtc>,
    /// Set when the order enters `Cancelled`
    pub cancelled_at: Option<DateTimeUtc>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one customer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each order belongs to one restaurant
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    /// One order has many lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    /// One order has at most one delivery assignment
    #[sea_orm(has_one = "super::delivery_assignment::Entity")]
    Delivery,
    /// One order has many history rows
    #[sea_orm(has_many = "super::order_status_history::Entity")]
    History,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::delivery_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delivery.def()
    }
}

impl Related<super::order_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
