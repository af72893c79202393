//! User entity - Every account in the system, tagged with a [`UserRole`].
//!
//! Passwords are never handled here; `password_hash` is an opaque value produced
//! by whatever authentication layer sits in front of the service.

use super::status::UserRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub full_name: String,
    /// Login email, stored lowercased
    #[sea_orm(unique)]
    pub email: String,
    /// Contact number
    #[sea_orm(unique)]
    pub phone_number: String,
    /// Account role
    pub role: UserRole,
    /// Opaque credential hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional street address
    pub address: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Orders placed by this user
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// Restaurants owned by this user
    #[sea_orm(has_many = "super::restaurant::Entity")]
    Restaurants,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
