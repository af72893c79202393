//! Menu management - owner-scoped editing of menu items and customer-facing browsing.
//!
//! Prices are normalized to two decimal places on the way in. Changing a price
//! here only affects future checkouts; placed orders keep their captured price.

use super::{required, restaurant::ensure_manages};
use crate::{
    entities::{MenuCategory, MenuItem, menu_item, user},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Editable menu item fields, shared by create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemInput {
    /// Display name
    pub name: String,
    /// Price; rounded to two decimal places
    pub price: Decimal,
    /// Food or Drink
    #[serde(default)]
    pub category: Option<MenuCategory>,
    /// Whether customers can order it right now
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// Menu browsing filters.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuFilter {
    /// Only this category
    #[serde(default)]
    pub category: Option<MenuCategory>,
    /// Hide unavailable items (default)
    #[serde(default = "default_available")]
    pub only_available: bool,
    /// Substring of the item name
    #[serde(default)]
    pub q: Option<String>,
}

impl Default for MenuFilter {
    fn default() -> Self {
        Self {
            category: None,
            only_available: true,
            q: None,
        }
    }
}

/// Rejects negative prices and rounds to cents.
pub fn normalize_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::InvalidPrice { price });
    }
    Ok(price.round_dp(2))
}

/// Adds an item to a restaurant's menu. Only the restaurant's owner (or an admin) may do this.
pub async fn create_menu_item(
    db: &DatabaseConnection,
    actor: &user::Model,
    restaurant_id: i64,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    let name = required(&input.name, "Item name")?;
    let price = normalize_price(input.price)?;
    let restaurant = super::restaurant::require_restaurant(db, restaurant_id).await?;
    ensure_manages(actor, &restaurant)?;

    let created = menu_item::ActiveModel {
        restaurant_id: Set(restaurant.id),
        name: Set(name),
        price: Set(price),
        category: Set(input.category),
        available: Set(input.available),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Added menu item {} '{}' at {} to restaurant {}",
        created.id, created.name, created.price, restaurant_id
    );
    Ok(created)
}

/// Replaces a menu item's editable fields.
pub async fn update_menu_item(
    db: &DatabaseConnection,
    actor: &user::Model,
    menu_item_id: i64,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    let name = required(&input.name, "Item name")?;
    let price = normalize_price(input.price)?;
    let existing = require_menu_item(db, menu_item_id).await?;
    let restaurant = super::restaurant::require_restaurant(db, existing.restaurant_id).await?;
    ensure_manages(actor, &restaurant)?;

    let mut active: menu_item::ActiveModel = existing.into();
    active.name = Set(name);
    active.price = Set(price);
    active.category = Set(input.category);
    active.available = Set(input.available);

    let updated = active.update(db).await?;
    info!("Updated menu item {}", menu_item_id);
    Ok(updated)
}

/// Removes a menu item. Items referenced by past orders cannot be removed
/// ([`Error::Conflict`]); mark them unavailable instead.
pub async fn delete_menu_item(
    db: &DatabaseConnection,
    actor: &user::Model,
    menu_item_id: i64,
) -> Result<()> {
    let existing = require_menu_item(db, menu_item_id).await?;
    let restaurant = super::restaurant::require_restaurant(db, existing.restaurant_id).await?;
    ensure_manages(actor, &restaurant)?;

    existing.delete(db).await?;
    info!("Deleted menu item {}", menu_item_id);
    Ok(())
}

/// Finds a menu item by id, failing with [`Error::NotFound`].
pub async fn require_menu_item<C>(conn: &C, menu_item_id: i64) -> Result<menu_item::Model>
where
    C: ConnectionTrait,
{
    MenuItem::find_by_id(menu_item_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Menu item", menu_item_id))
}

/// A restaurant's menu, newest items first.
pub async fn list_menu(
    db: &DatabaseConnection,
    restaurant_id: i64,
    filter: &MenuFilter,
) -> Result<Vec<menu_item::Model>> {
    let mut query = MenuItem::find().filter(menu_item::Column::RestaurantId.eq(restaurant_id));
    if filter.only_available {
        query = query.filter(menu_item::Column::Available.eq(true));
    }
    if let Some(category) = filter.category {
        query = query.filter(menu_item::Column::Category.eq(category));
    }
    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        query = query.filter(menu_item::Column::Name.contains(q));
    }
    query
        .order_by_desc(menu_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::UserRole;
    use crate::test_utils::*;

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price(price("4.999")).unwrap(), price("5.00"));
        assert_eq!(normalize_price(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert!(matches!(
            normalize_price(price("-1.00")),
            Err(Error::InvalidPrice { .. })
        ));
    }

    #[tokio::test]
    async fn test_owner_manages_own_menu_only() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner 1", UserRole::RestaurantOwner).await?;
        let intruder = create_test_user(&db, "Owner 2", UserRole::RestaurantOwner).await?;
        let restaurant = create_test_restaurant(&db, "Karachi Bites", Some(owner.id)).await?;

        let item = create_menu_item(&db, &owner, restaurant.id, menu_input("Fries", "199.00")).await?;
        assert_eq!(item.price, price("199.00"));
        assert!(item.available);

        let result = create_menu_item(&db, &intruder, restaurant.id, menu_input("Tea", "50")).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let result = delete_menu_item(&db, &intruder, item.id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        delete_menu_item(&db, &owner, item.id).await?;
        let result = require_menu_item(&db, item.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_menu_item() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner 1", UserRole::RestaurantOwner).await?;
        let restaurant = create_test_restaurant(&db, "Karachi Bites", Some(owner.id)).await?;
        let item = create_menu_item(&db, &owner, restaurant.id, menu_input("Fries", "199.00")).await?;

        let mut input = menu_input("Large Fries", "249.50");
        input.available = false;
        input.category = Some(MenuCategory::Food);
        let updated = update_menu_item(&db, &owner, item.id, input).await?;
        assert_eq!(updated.name, "Large Fries");
        assert_eq!(updated.price, price("249.50"));
        assert!(!updated.available);
        assert_eq!(updated.category, Some(MenuCategory::Food));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_menu_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner 1", UserRole::RestaurantOwner).await?;
        let restaurant = create_test_restaurant(&db, "Karachi Bites", Some(owner.id)).await?;

        let mut burger = menu_input("Chicken Burger", "499.00");
        burger.category = Some(MenuCategory::Food);
        create_menu_item(&db, &owner, restaurant.id, burger).await?;
        let mut drink = menu_input("Cold Drink", "120.00");
        drink.category = Some(MenuCategory::Drink);
        create_menu_item(&db, &owner, restaurant.id, drink).await?;
        let mut wrap = menu_input("Zinger Wrap", "549.00");
        wrap.category = Some(MenuCategory::Food);
        wrap.available = false;
        create_menu_item(&db, &owner, restaurant.id, wrap).await?;

        let visible = list_menu(&db, restaurant.id, &MenuFilter::default()).await?;
        assert_eq!(visible.len(), 2);

        let everything = list_menu(
            &db,
            restaurant.id,
            &MenuFilter {
                only_available: false,
                ..MenuFilter::default()
            },
        )
        .await?;
        assert_eq!(everything.len(), 3);
        assert_eq!(everything[0].name, "Zinger Wrap");

        let drinks = list_menu(
            &db,
            restaurant.id,
            &MenuFilter {
                category: Some(MenuCategory::Drink),
                ..MenuFilter::default()
            },
        )
        .await?;
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].name, "Cold Drink");

        let burgers = list_menu(
            &db,
            restaurant.id,
            &MenuFilter {
                q: Some("Burger".to_string()),
                ..MenuFilter::default()
            },
        )
        .await?;
        assert_eq!(burgers.len(), 1);
        Ok(())
    }
}
