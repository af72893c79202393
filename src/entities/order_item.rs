//! Order item entity - One line of an order.
//!
//! `price_at_purchase` is copied from the menu at checkout and never updated afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Menu item that was ordered
    pub menu_item_id: i64,
    /// Units ordered, at least one
    pub quantity: i32,
    /// Unit price captured at checkout
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_at_purchase: Decimal,
}

/// Defines relationships between OrderItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each line references one menu item
    #[sea_orm(
        belongs_to = "super::menu_item::Entity",
        from = "Column::MenuItemId",
        to = "super::menu_item::Column::Id"
    )]
    MenuItem,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
