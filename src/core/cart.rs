//! Shopping cart - a single-restaurant pending order held outside the database.
//!
//! A [`Cart`] is a plain serializable value, so any session layer can hold it.
//! [`CartStore`] is the in-process holder used by the HTTP API, keyed by user id;
//! a request locks the user's cart for as long as it works on it.
//! Adding an item from a different restaurant discards the previous restaurant's
//! lines before adding the new one.

use crate::{
    entities::{MenuItem, RestaurantStatus, menu_item, restaurant},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

fn line_quantity(quantity: i64) -> Result<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| (1..=MAX_LINE_QUANTITY).contains(q))
        .ok_or(Error::InvalidQuantity { quantity })
}

/// Pending order: one restaurant and a quantity per menu item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Restaurant every line belongs to; `None` when empty
    pub restaurant_id: Option<i64>,
    /// Menu item id → quantity (1 to [`MAX_LINE_QUANTITY`])
    pub items: BTreeMap<i64, u32>,
}

impl Cart {
    /// True when there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restaurant_id.is_none() || self.items.is_empty()
    }

    /// Drops every line and forgets the restaurant.
    pub fn clear(&mut self) {
        self.restaurant_id = None;
        self.items.clear();
    }

    /// Adds `quantity` of an item, resetting the cart first if it holds
    /// another restaurant's items. No database validation happens here.
    ///
    /// Fails with [`Error::InvalidQuantity`], leaving the cart untouched, when
    /// the line would exceed [`MAX_LINE_QUANTITY`].
    fn put(&mut self, restaurant_id: i64, menu_item_id: i64, quantity: u32) -> Result<()> {
        let switching = self.restaurant_id.is_some_and(|current| current != restaurant_id);
        let current = if switching {
            0
        } else {
            self.items.get(&menu_item_id).copied().unwrap_or(0)
        };
        let total = current
            .checked_add(quantity)
            .filter(|total| *total <= MAX_LINE_QUANTITY)
            .ok_or(Error::InvalidQuantity {
                quantity: i64::from(current) + i64::from(quantity),
            })?;

        if switching {
            debug!(
                "Cart switched restaurants ({:?} -> {}), dropping {} lines",
                self.restaurant_id,
                restaurant_id,
                self.items.len()
            );
            self.clear();
        }
        self.restaurant_id = Some(restaurant_id);
        self.items.insert(menu_item_id, total);
        Ok(())
    }

    /// Replaces the cart's quantities. Non-positive quantities drop the line;
    /// a cart left with no lines forgets its restaurant. A quantity above
    /// [`MAX_LINE_QUANTITY`] rejects the whole update.
    pub fn set_quantities<I>(&mut self, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut items = BTreeMap::new();
        for (id, quantity) in updates {
            if quantity > 0 {
                items.insert(id, line_quantity(quantity)?);
            }
        }
        self.items = items;
        if self.items.is_empty() {
            self.clear();
        }
        Ok(())
    }
}

/// Validates and adds an item to the cart.
///
/// The restaurant must exist and be Active, the item must exist, belong to that
/// restaurant and be available, and `quantity` must be between one and
/// [`MAX_LINE_QUANTITY`], also once added to what the cart already holds.
pub async fn add_item(
    db: &DatabaseConnection,
    cart: &mut Cart,
    restaurant_id: i64,
    menu_item_id: i64,
    quantity: i64,
) -> Result<()> {
    let qty = line_quantity(quantity)?;

    let restaurant = super::restaurant::require_restaurant(db, restaurant_id).await?;
    if restaurant.status != RestaurantStatus::Active {
        return Err(Error::RestaurantInactive { id: restaurant_id });
    }

    let item = super::menu::require_menu_item(db, menu_item_id).await?;
    if item.restaurant_id != restaurant_id {
        return Err(Error::validation(format!(
            "Menu item {menu_item_id} does not belong to restaurant {restaurant_id}"
        )));
    }
    if !item.available {
        return Err(Error::ItemUnavailable { id: menu_item_id });
    }

    cart.put(restaurant_id, menu_item_id, qty)?;
    debug!(
        "Added {} x item {} to cart for restaurant {}",
        qty, menu_item_id, restaurant_id
    );
    Ok(())
}

/// One cart line at the current menu price.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// The menu item as it is now
    pub menu_item: menu_item::Model,
    /// Quantity in the cart
    pub quantity: u32,
    /// `price × quantity`
    pub line_total: Decimal,
}

/// A cart resolved against the database for display.
#[derive(Debug, Clone, Serialize)]
pub struct PricedCart {
    /// The cart's restaurant, if it still exists
    pub restaurant: Option<restaurant::Model>,
    /// Lines whose menu item still exists
    pub lines: Vec<CartLine>,
    /// Sum of line totals
    pub total: Decimal,
}

/// Prices the cart at current menu prices. Lines for deleted items are skipped.
pub async fn price_cart(db: &DatabaseConnection, cart: &Cart) -> Result<PricedCart> {
    let Some(restaurant_id) = cart.restaurant_id else {
        return Ok(PricedCart {
            restaurant: None,
            lines: Vec::new(),
            total: Decimal::ZERO,
        });
    };
    let restaurant = super::restaurant::get_restaurant(db, restaurant_id).await?;

    let mut lines = Vec::with_capacity(cart.items.len());
    if restaurant.is_some() {
        for (&menu_item_id, &quantity) in &cart.items {
            let Some(menu_item) = MenuItem::find_by_id(menu_item_id).one(db).await? else {
                continue;
            };
            let line_total = menu_item.price * Decimal::from(quantity);
            lines.push(CartLine {
                menu_item,
                quantity,
                line_total,
            });
        }
    }
    let total = lines.iter().map(|line| line.line_total).sum();

    Ok(PricedCart {
        restaurant,
        lines,
        total,
    })
}

/// In-process cart holder keyed by user id.
///
/// Each user's cart sits behind its own async mutex. Handlers hold the guard
/// from [`CartStore::lock`] across the whole read-modify-write, so two requests
/// for the same user run one after the other.
#[derive(Debug, Default)]
pub struct CartStore {
    carts: Mutex<HashMap<i64, Arc<Mutex<Cart>>>>,
}

impl CartStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the user's cart, creating an empty one on first use.
    pub async fn lock(&self, user_id: i64) -> OwnedMutexGuard<Cart> {
        let slot = Arc::clone(self.carts.lock().await.entry(user_id).or_default());
        slot.lock_owned().await
    }

    /// A snapshot of the user's cart, or an empty one.
    pub async fn get(&self, user_id: i64) -> Cart {
        let slot = self.carts.lock().await.get(&user_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => Cart::default(),
        }
    }

    /// Empties the user's cart.
    pub async fn clear(&self, user_id: i64) {
        let mut cart = self.lock(user_id).await;
        if !cart.is_empty() {
            cart.clear();
            info!("Cleared cart for user {}", user_id);
        }
    }
}
