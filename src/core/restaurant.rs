//! Restaurant administration - create, edit, search and remove restaurants.

use super::required;
use crate::{
    entities::{Restaurant, RestaurantStatus, UserRole, restaurant, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Editable restaurant fields, shared by create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantInput {
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Defaults to Active
    #[serde(default = "default_status")]
    pub status: RestaurantStatus,
    /// Restaurant Owner to link, if any
    #[serde(default)]
    pub owner_id: Option<i64>,
}

const fn default_status() -> RestaurantStatus {
    RestaurantStatus::Active
}

/// Restaurant listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantFilter {
    /// Substring of the restaurant name
    #[serde(default)]
    pub q: Option<String>,
    /// Only restaurants with this status
    #[serde(default)]
    pub status: Option<RestaurantStatus>,
}

async fn check_owner(db: &DatabaseConnection, owner_id: Option<i64>) -> Result<()> {
    let Some(owner_id) = owner_id else {
        return Ok(());
    };
    let owner = super::user::require_user(db, owner_id).await?;
    if owner.role != UserRole::RestaurantOwner {
        return Err(Error::validation(format!(
            "User {owner_id} is not a Restaurant Owner"
        )));
    }
    Ok(())
}

/// Creates a restaurant. A linked owner must exist and be a Restaurant Owner.
pub async fn create_restaurant(
    db: &DatabaseConnection,
    input: RestaurantInput,
) -> Result<restaurant::Model> {
    let name = required(&input.name, "Restaurant name")?;
    let address = required(&input.address, "Address")?;
    check_owner(db, input.owner_id).await?;

    let created = restaurant::ActiveModel {
        owner_id: Set(input.owner_id),
        name: Set(name),
        address: Set(address),
        status: Set(input.status),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created restaurant {} '{}'", created.id, created.name);
    Ok(created)
}

/// Replaces a restaurant's editable fields.
pub async fn update_restaurant(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: RestaurantInput,
) -> Result<restaurant::Model> {
    let name = required(&input.name, "Restaurant name")?;
    let address = required(&input.address, "Address")?;
    let existing = require_restaurant(db, restaurant_id).await?;
    check_owner(db, input.owner_id).await?;

    let mut active: restaurant::ActiveModel = existing.into();
    active.name = Set(name);
    active.address = Set(address);
    active.status = Set(input.status);
    active.owner_id = Set(input.owner_id);

    let updated = active.update(db).await?;
    info!("Updated restaurant {}", restaurant_id);
    Ok(updated)
}

/// Deletes a restaurant.
///
/// Restaurants that still have menu items or orders are protected by foreign
/// keys; the database refuses and the caller gets [`Error::Conflict`].
pub async fn delete_restaurant(db: &DatabaseConnection, restaurant_id: i64) -> Result<()> {
    let existing = require_restaurant(db, restaurant_id).await?;
    existing.delete(db).await?;
    info!("Deleted restaurant {}", restaurant_id);
    Ok(())
}

/// Finds a restaurant by id.
pub async fn get_restaurant(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Option<restaurant::Model>> {
    Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a restaurant by id, failing with [`Error::NotFound`].
pub async fn require_restaurant<C>(conn: &C, restaurant_id: i64) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    Restaurant::find_by_id(restaurant_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Restaurant", restaurant_id))
}

/// Restaurants matching the filter, newest first.
pub async fn list_restaurants(
    db: &DatabaseConnection,
    filter: &RestaurantFilter,
) -> Result<Vec<restaurant::Model>> {
    let mut query = Restaurant::find();
    if let Some(status) = filter.status {
        query = query.filter(restaurant::Column::Status.eq(status));
    }
    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        query = query.filter(restaurant::Column::Name.contains(q));
    }
    query
        .order_by_desc(restaurant::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Restaurants linked to the given owner, newest first.
pub async fn restaurants_for_owner<C>(conn: &C, owner_id: i64) -> Result<Vec<restaurant::Model>>
where
    C: ConnectionTrait,
{
    Restaurant::find()
        .filter(restaurant::Column::OwnerId.eq(owner_id))
        .order_by_desc(restaurant::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Fails with [`Error::Forbidden`] unless `actor` may manage `restaurant`:
/// admins manage every restaurant, owners only their own.
pub fn ensure_manages(actor: &user::Model, restaurant: &restaurant::Model) -> Result<()> {
    let allowed = match actor.role {
        UserRole::Admin => true,
        UserRole::RestaurantOwner => restaurant.owner_id == Some(actor.id),
        UserRole::Customer | UserRole::DeliveryAgent => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::forbidden(
            actor.role,
            format!("manage restaurant {}", restaurant.id),
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_restaurant_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_restaurant(
            &db,
            RestaurantInput {
                name: "  ".to_string(),
                address: "Main Road".to_string(),
                status: RestaurantStatus::Active,
                owner_id: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_restaurant_requires_owner_role() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_user(&db, "Customer 1", UserRole::Customer).await?;

        let result = create_restaurant(&db, restaurant_input("Lahore Grill", Some(customer.id))).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_restaurant(&db, restaurant_input("Lahore Grill", Some(999))).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "User", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_restaurants_filters() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_restaurant(&db, "Karachi Bites", None).await?;
        create_test_restaurant(&db, "Lahore Grill", None).await?;
        let mut closed = restaurant_input("Lahore Cafe", None);
        closed.status = RestaurantStatus::Inactive;
        create_restaurant(&db, closed).await?;

        let all = list_restaurants(&db, &RestaurantFilter::default()).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Lahore Cafe");

        let lahore = list_restaurants(
            &db,
            &RestaurantFilter {
                q: Some("Lahore".to_string()),
                status: None,
            },
        )
        .await?;
        assert_eq!(lahore.len(), 2);

        let active_lahore = list_restaurants(
            &db,
            &RestaurantFilter {
                q: Some("Lahore".to_string()),
                status: Some(RestaurantStatus::Active),
            },
        )
        .await?;
        assert_eq!(active_lahore.len(), 1);
        assert_eq!(active_lahore[0].name, "Lahore Grill");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_restaurant_links_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner 1", UserRole::RestaurantOwner).await?;
        let created = create_test_restaurant(&db, "Karachi Bites", None).await?;

        let mut input = restaurant_input("Karachi Bites 2", Some(owner.id));
        input.status = RestaurantStatus::Inactive;
        let updated = update_restaurant(&db, created.id, input).await?;
        assert_eq!(updated.name, "Karachi Bites 2");
        assert_eq!(updated.owner_id, Some(owner.id));
        assert_eq!(updated.status, RestaurantStatus::Inactive);

        let owned = restaurants_for_owner(&db, owner.id).await?;
        assert_eq!(owned.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_restaurant_with_menu_is_a_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_restaurant(&db, "Karachi Bites", None).await?;
        create_test_menu_item(&db, created.id, "Fries", price("199.00")).await?;

        let result = delete_restaurant(&db, created.id).await;
        assert!(result.is_err());
        assert!(get_restaurant(&db, created.id).await?.is_some());

        let empty = create_test_restaurant(&db, "Empty", None).await?;
        delete_restaurant(&db, empty.id).await?;
        assert!(get_restaurant(&db, empty.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_manages() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner 1", UserRole::RestaurantOwner).await?;
        let other = create_test_user(&db, "Owner 2", UserRole::RestaurantOwner).await?;
        let admin = create_test_user(&db, "Admin", UserRole::Admin).await?;
        let owned = create_test_restaurant(&db, "Karachi Bites", Some(owner.id)).await?;

        assert!(ensure_manages(&owner, &owned).is_ok());
        assert!(ensure_manages(&admin, &owned).is_ok());
        assert!(matches!(
            ensure_manages(&other, &owned),
            Err(Error::Forbidden { .. })
        ));
        Ok(())
    }
}
