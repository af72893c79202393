//! Shared test utilities for the food aggregator.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        cart::{Cart, add_item},
        menu::MenuItemInput,
        order::{CheckoutInput, checkout},
        restaurant::{RestaurantInput, create_restaurant, require_restaurant},
        user::{NewUser, create_user},
    },
    entities::{PaymentMethod, RestaurantStatus, UserRole, menu_item, order, restaurant, user},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a decimal literal such as `"499.00"`.
pub fn price(value: &str) -> Decimal {
    value.parse().unwrap()
}

fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Account input with an email and phone number derived from `name`.
///
/// # Defaults
/// * `phone_number`: `"phone-<name>"`
/// * `password_hash`: `"test-hash"`
/// * `address`: None
pub fn new_user_input(name: &str, email: &str, role: UserRole) -> NewUser {
    NewUser {
        full_name: name.to_string(),
        email: email.to_string(),
        phone_number: format!("phone-{}", slug(name)),
        role,
        password_hash: "test-hash".to_string(),
        address: None,
    }
}

/// Creates a user named `name` with email `<name>@test.local`.
/// Names must be unique within one test database.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    role: UserRole,
) -> Result<user::Model> {
    let email = format!("{}@test.local", slug(name));
    create_user(db, new_user_input(name, &email, role)).await
}

/// Builds an active restaurant input at a fixed address.
pub fn restaurant_input(name: &str, owner_id: Option<i64>) -> RestaurantInput {
    RestaurantInput {
        name: name.to_string(),
        address: "Main Road Block 1".to_string(),
        status: RestaurantStatus::Active,
        owner_id,
    }
}

/// Creates an active restaurant, optionally linked to an owner.
pub async fn create_test_restaurant(
    db: &DatabaseConnection,
    name: &str,
    owner_id: Option<i64>,
) -> Result<restaurant::Model> {
    create_restaurant(db, restaurant_input(name, owner_id)).await
}

/// Flips a restaurant's status without going through the admin operation.
pub async fn set_restaurant_status(
    db: &DatabaseConnection,
    restaurant_id: i64,
    status: RestaurantStatus,
) -> Result<restaurant::Model> {
    let existing = require_restaurant(db, restaurant_id).await?;
    let mut active: restaurant::ActiveModel = existing.into();
    active.status = Set(status);
    Ok(active.update(db).await?)
}

/// Available, uncategorized menu item input.
pub fn menu_input(name: &str, amount: &str) -> MenuItemInput {
    MenuItemInput {
        name: name.to_string(),
        price: price(amount),
        category: None,
        available: true,
    }
}

/// Inserts an available menu item directly, bypassing owner checks.
pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    amount: Decimal,
) -> Result<menu_item::Model> {
    let item = menu_item::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set(name.to_string()),
        price: Set(amount),
        category: Set(None),
        available: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    Ok(item.insert(db).await?)
}

/// An unsaved user model for tests that never touch the database.
pub fn user_model(id: i64, role: UserRole) -> user::Model {
    user::Model {
        id,
        full_name: format!("User {id}"),
        email: format!("user{id}@test.local"),
        phone_number: format!("phone-{id}"),
        role,
        password_hash: "test-hash".to_string(),
        address: None,
        created_at: chrono::Utc::now(),
    }
}

/// Cash-on-delivery checkout with a short instruction.
pub fn cod() -> CheckoutInput {
    CheckoutInput {
        payment_method: PaymentMethod::Cod,
        delivery_instructions: Some("  Ring twice ".to_string()),
    }
}

/// A database with one of each role and a freshly placed order.
pub struct OrderFixture {
    /// Database connection
    pub db: DatabaseConnection,
    /// Admin account
    pub admin: user::Model,
    /// Owner of `restaurant`
    pub owner: user::Model,
    /// Customer who placed `order`
    pub customer: user::Model,
    /// Delivery agent (not yet assigned)
    pub agent: user::Model,
    /// Active restaurant owned by `owner`
    pub restaurant: restaurant::Model,
    /// Burger at 499.00
    pub burger: menu_item::Model,
    /// Fries at 199.00
    pub fries: menu_item::Model,
    /// Placed order: 2 × burger + 1 × fries = 1197.00
    pub order: order::Model,
}

/// Sets up [`OrderFixture`]. The order has exactly one (Placed) history row.
pub async fn setup_with_order() -> Result<OrderFixture> {
    let db = setup_test_db().await?;
    let admin = create_test_user(&db, "Admin", UserRole::Admin).await?;
    let owner = create_test_user(&db, "Owner 1", UserRole::RestaurantOwner).await?;
    let customer = create_test_user(&db, "Customer 1", UserRole::Customer).await?;
    let agent = create_test_user(&db, "Agent 1", UserRole::DeliveryAgent).await?;
    let restaurant = create_test_restaurant(&db, "Karachi Bites", Some(owner.id)).await?;
    let burger = create_test_menu_item(&db, restaurant.id, "Chicken Burger", price("499.00")).await?;
    let fries = create_test_menu_item(&db, restaurant.id, "Fries", price("199.00")).await?;

    let mut cart = Cart::default();
    add_item(&db, &mut cart, restaurant.id, burger.id, 2).await?;
    add_item(&db, &mut cart, restaurant.id, fries.id, 1).await?;
    let order = checkout(&db, &customer, &mut cart, cod()).await?;

    Ok(OrderFixture {
        db,
        admin,
        owner,
        customer,
        agent,
        restaurant,
        burger,
        fries,
        order,
    })
}
