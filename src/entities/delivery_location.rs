//! Delivery location entity - Append-only position pings sent by the agent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery location database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_locations")]
pub struct Model {
    /// Unique identifier for the ping
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Delivery this ping belongs to
    pub delivery_id: i64,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Optional agent note ("stuck in traffic")
    pub note: Option<String>,
    /// When the ping was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between DeliveryLocation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ping belongs to one delivery
    #[sea_orm(
        belongs_to = "super::delivery_assignment::Entity",
        from = "Column::DeliveryId",
        to = "super::delivery_assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Delivery,
}

impl Related<super::delivery_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
