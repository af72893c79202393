//! Restaurant entity - A storefront owned (optionally) by a restaurant owner.

use super::status::RestaurantStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    /// Unique identifier for the restaurant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, if one has been linked
    pub owner_id: Option<i64>,
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Active restaurants accept orders
    pub status: RestaurantStatus,
    /// When the restaurant was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Restaurant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each restaurant may belong to one owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    /// One restaurant has many menu items
    #[sea_orm(has_many = "super::menu_item::Entity")]
    MenuItems,
    /// One restaurant has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
