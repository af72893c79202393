//! Menu item entity - A priced dish or drink offered by one restaurant.
//!
//! The price here is the *current* price. Orders copy it into
//! `order_items.price_at_purchase` at checkout, so editing it never rewrites history.

use super::status::MenuCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Unique identifier for the menu item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Restaurant offering this item
    pub restaurant_id: i64,
    /// Display name
    pub name: String,
    /// Current price, two decimal places
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Food or Drink, if categorized
    pub category: Option<MenuCategory>,
    /// Unavailable items cannot be added to carts or checked out
    pub available: bool,
    /// When the item was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between MenuItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each menu item belongs to one restaurant
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
