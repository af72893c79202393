//! First-run seeding of users, restaurants and menus.

use super::{menu::normalize_price, user::NewUser};
use crate::{
    config::seed::{SeedConfig, SeedRestaurant},
    entities::{User, UserRole, menu_item, restaurant},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, PaginatorTrait, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Inserts the seed data if the database has no users yet.
///
/// Everything is written in one transaction. Returns whether anything was
/// inserted. A restaurant naming an owner email that is not a seeded
/// Restaurant Owner aborts the whole seed with [`Error::Config`].
pub async fn seed_if_empty(db: &DatabaseConnection, seed: &SeedConfig) -> Result<bool> {
    if User::find().count(db).await? > 0 {
        info!("Database already has users, skipping seed");
        return Ok(false);
    }

    let txn = db.begin().await?;

    let mut owners: HashMap<String, i64> = HashMap::new();
    for seed_user in &seed.users {
        let new_user = NewUser {
            full_name: seed_user.full_name.clone(),
            email: seed_user.email.clone(),
            phone_number: seed_user.phone_number.clone(),
            role: seed_user.role,
            password_hash: seed_user.password_hash.clone(),
            address: seed_user.address.clone(),
        };
        let created = new_user.into_active_model()?.insert(&txn).await?;
        if created.role == UserRole::RestaurantOwner {
            owners.insert(created.email.clone(), created.id);
        }
    }

    let mut items = 0_usize;
    for seed_restaurant in &seed.restaurants {
        items += insert_restaurant(&txn, seed_restaurant, &owners).await?;
    }

    txn.commit().await?;
    info!(
        "Seeded {} users, {} restaurants and {} menu items",
        seed.users.len(),
        seed.restaurants.len(),
        items
    );
    Ok(true)
}

async fn insert_restaurant(
    txn: &DatabaseTransaction,
    seed: &SeedRestaurant,
    owners: &HashMap<String, i64>,
) -> Result<usize> {
    let owner_id = match &seed.owner_email {
        Some(email) => Some(
            *owners
                .get(&email.trim().to_lowercase())
                .ok_or_else(|| Error::Config {
                    message: format!(
                        "Restaurant '{}' names unknown owner '{}'",
                        seed.name, email
                    ),
                })?,
        ),
        None => None,
    };

    let created = restaurant::ActiveModel {
        owner_id: Set(owner_id),
        name: Set(seed.name.clone()),
        address: Set(seed.address.clone()),
        status: Set(seed.status),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for item in &seed.menu {
        menu_item::ActiveModel {
            restaurant_id: Set(created.id),
            name: Set(item.name.clone()),
            price: Set(normalize_price(item.price)?),
            category: Set(item.category),
            available: Set(item.available),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(seed.menu.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::seed::parse_seed;
    use crate::core::menu::{MenuFilter, list_menu};
    use crate::core::restaurant::{RestaurantFilter, list_restaurants};
    use crate::test_utils::*;

    const SEED: &str = r#"
[[users]]
full_name = "Admin"
email = "admin@example.com"
phone_number = "9000000001"
role = "Admin"
password_hash = "x"

[[users]]
full_name = "Owner One"
email = "Owner1@Example.com"
phone_number = "9000000002"
role = "Restaurant Owner"
password_hash = "x"

[[restaurants]]
name = "Burger Barn"
address = "1 Main St"
owner_email = "owner1@example.com"

[[restaurants.menu]]
name = "Burger"
price = "499.00"
category = "Food"

[[restaurants.menu]]
name = "Cola"
price = "60"
category = "Drink"
available = false
"#;

    #[tokio::test]
    async fn test_seed_if_empty_inserts_once() -> Result<()> {
        let db = setup_test_db().await?;
        let seed = parse_seed(SEED)?;

        assert!(seed_if_empty(&db, &seed).await?);
        assert_eq!(User::find().count(&db).await?, 2);

        let restaurants = list_restaurants(&db, &RestaurantFilter::default()).await?;
        assert_eq!(restaurants.len(), 1);
        assert!(restaurants[0].owner_id.is_some());

        let all = MenuFilter {
            only_available: false,
            ..MenuFilter::default()
        };
        let menu = list_menu(&db, restaurants[0].id, &all).await?;
        assert_eq!(menu.len(), 2);
        assert_eq!(list_menu(&db, restaurants[0].id, &MenuFilter::default()).await?.len(), 1);

        assert!(!seed_if_empty(&db, &seed).await?);
        assert_eq!(User::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_owner_rolls_back_everything() -> Result<()> {
        let db = setup_test_db().await?;
        let seed = parse_seed(&SEED.replace("owner1@example.com", "nobody@example.com"))?;

        let result = seed_if_empty(&db, &seed).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        assert_eq!(User::find().count(&db).await?, 0);
        Ok(())
    }
}
