//! Admin overview - headline counts and the most recent orders.

use super::user::require_role;
use crate::{
    entities::{Order, Restaurant, RestaurantStatus, User, UserRole, order, restaurant, user},
    errors::Result,
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

const RECENT_ORDERS: u64 = 10;

/// Numbers shown on the admin landing page.
#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    /// Restaurants currently taking orders
    pub active_restaurants: u64,
    /// All restaurants
    pub total_restaurants: u64,
    /// Registered delivery agents
    pub total_agents: u64,
    /// Latest orders, newest first
    pub recent_orders: Vec<order::Model>,
}

/// Builds the admin dashboard.
pub async fn admin_dashboard(db: &DatabaseConnection, admin: &user::Model) -> Result<AdminDashboard> {
    require_role(admin, UserRole::Admin, "view the admin dashboard")?;

    let total_restaurants = Restaurant::find().count(db).await?;
    let active_restaurants = Restaurant::find()
        .filter(restaurant::Column::Status.eq(RestaurantStatus::Active))
        .count(db)
        .await?;
    let total_agents = User::find()
        .filter(user::Column::Role.eq(UserRole::DeliveryAgent))
        .count(db)
        .await?;
    let recent_orders = Order::find()
        .order_by_desc(order::Column::Id)
        .limit(RECENT_ORDERS)
        .all(db)
        .await?;

    Ok(AdminDashboard {
        active_restaurants,
        total_restaurants,
        total_agents,
        recent_orders,
    })
}
