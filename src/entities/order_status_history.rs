//! Order status history entity - Append-only audit log of order transitions.

use super::status::OrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_status_history")]
pub struct Model {
    /// Unique identifier for the history row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order that changed
    pub order_id: i64,
    /// Status the order entered
    pub status: OrderStatus,
    /// User who drove the change, if known
    pub actor_user_id: Option<i64>,
    /// Short human-readable reason
    pub note: Option<String>,
    /// When the change happened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between OrderStatusHistory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each row may name its actor
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorUserId",
        to = "super::user::Column::Id"
    )]
    Actor,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
