//! Seed data loading from a TOML file.
//!
//! The file describes the users, restaurants and menus inserted into an empty
//! database on first start. Restaurants name their owner by email so the file
//! does not depend on generated ids.

use crate::entities::{MenuCategory, RestaurantStatus, UserRole};
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire seed file
#[derive(Debug, Deserialize, Default)]
pub struct SeedConfig {
    /// Accounts to create
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Restaurants to create, with their menus
    #[serde(default)]
    pub restaurants: Vec<SeedRestaurant>,
}

/// A single account
#[derive(Debug, Deserialize, Clone)]
pub struct SeedUser {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Contact number
    pub phone_number: String,
    /// Account role
    pub role: UserRole,
    /// Pre-computed credential hash
    pub password_hash: String,
    /// Optional address
    #[serde(default)]
    pub address: Option<String>,
}

/// A restaurant and its menu
#[derive(Debug, Deserialize, Clone)]
pub struct SeedRestaurant {
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Email of a seeded Restaurant Owner
    #[serde(default)]
    pub owner_email: Option<String>,
    /// Defaults to Active
    #[serde(default = "default_restaurant_status")]
    pub status: RestaurantStatus,
    /// Menu items
    #[serde(default)]
    pub menu: Vec<SeedMenuItem>,
}

/// A single menu item
#[derive(Debug, Deserialize, Clone)]
pub struct SeedMenuItem {
    /// Display name
    pub name: String,
    /// Price, written as a string to keep it exact (`"499.00"`)
    pub price: Decimal,
    /// Food or Drink
    #[serde(default)]
    pub category: Option<MenuCategory>,
    /// Defaults to available
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_restaurant_status() -> RestaurantStatus {
    RestaurantStatus::Active
}

const fn default_available() -> bool {
    true
}

/// Loads seed data from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {:?}: {e}", path.as_ref()),
    })?;
    parse_seed(&contents)
}

/// Parses seed data from TOML text.
pub fn parse_seed(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_seed_config() {
        let toml_str = r#"
            [[users]]
            full_name = "Owner 1"
            email = "owner1@fa.local"
            phone_number = "0311-0000001"
            role = "Restaurant Owner"
            password_hash = "x"

            [[restaurants]]
            name = "Karachi Bites"
            address = "Main Road Block 1"
            owner_email = "owner1@fa.local"

            [[restaurants.menu]]
            name = "Chicken Burger"
            price = "499.00"
            category = "Food"

            [[restaurants.menu]]
            name = "Cold Drink"
            price = "120.00"
            category = "Drink"
            available = false
        "#;

        let config = parse_seed(toml_str).unwrap();
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].role, UserRole::RestaurantOwner);
        assert_eq!(config.restaurants[0].status, RestaurantStatus::Active);
        assert_eq!(config.restaurants[0].menu[0].price, Decimal::new(49900, 2));
        assert!(config.restaurants[0].menu[0].available);
        assert!(!config.restaurants[0].menu[1].available);
    }

    #[test]
    fn test_parse_seed_rejects_unknown_role() {
        let toml_str = r#"
            [[users]]
            full_name = "X"
            email = "x@fa.local"
            phone_number = "1"
            role = "Chef"
            password_hash = "x"
        "#;
        assert!(matches!(parse_seed(toml_str), Err(Error::Config { .. })));
    }

    #[test]
    fn test_bundled_seed_file_parses() {
        let config = parse_seed(include_str!("../../seed.toml")).unwrap();
        assert_eq!(config.users.len(), 21);
        assert_eq!(config.restaurants.len(), 5);
        assert!(config.restaurants.iter().all(|r| r.menu.len() == 5));
        assert!(config.restaurants.iter().all(|r| r.owner_email.is_some()));
    }
}
