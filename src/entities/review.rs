//! Review entity - A 1 to 5 rating of either a restaurant or a delivery agent.
//!
//! Exactly one of `restaurant_id` and `delivery_agent_id` is set. Reviews are
//! stored for other tools to read; this service only creates the table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier for the review
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewer
    pub user_id: i64,
    /// Reviewed restaurant
    pub restaurant_id: Option<i64>,
    /// Reviewed agent
    pub delivery_agent_id: Option<i64>,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Optional comment
    pub comment: Option<String>,
    /// When the review was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Review and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review is written by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Reviewer,
    /// Each review may target a restaurant
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
}

impl ActiveModelBehavior for ActiveModel {}
