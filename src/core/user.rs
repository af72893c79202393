//! Account management - creating users and administering delivery agents.
//!
//! Credentials are opaque: callers hand in an already-computed `password_hash`.

use super::{required, trimmed_or_none};
use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields needed to create an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Display name
    pub full_name: String,
    /// Login email; trimmed and lowercased before storage
    pub email: String,
    /// Contact number
    pub phone_number: String,
    /// Account role
    pub role: UserRole,
    /// Opaque credential hash
    pub password_hash: String,
    /// Optional address
    #[serde(default)]
    pub address: Option<String>,
}

impl NewUser {
    /// Validates and normalizes the input into an insertable active model.
    pub fn into_active_model(self) -> Result<user::ActiveModel> {
        let email = required(&self.email, "Email")?.to_lowercase();
        if !email.contains('@') {
            return Err(Error::validation(format!("'{email}' is not an email address")));
        }
        if self.password_hash.is_empty() {
            return Err(Error::validation("Password hash cannot be empty"));
        }

        Ok(user::ActiveModel {
            full_name: Set(required(&self.full_name, "Full name")?),
            email: Set(email),
            phone_number: Set(required(&self.phone_number, "Phone number")?),
            role: Set(self.role),
            password_hash: Set(self.password_hash),
            address: Set(trimmed_or_none(self.address)),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        })
    }
}

/// Profile fields an admin may change on a delivery agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentUpdate {
    /// Display name
    pub full_name: String,
    /// Contact number
    pub phone_number: String,
    /// Optional address; blank clears it
    #[serde(default)]
    pub address: Option<String>,
    /// New credential hash; `None` keeps the current one
    #[serde(default)]
    pub password_hash: Option<String>,
}

/// Creates a new account.
///
/// Duplicate emails or phone numbers are rejected by the database with
/// [`Error::Conflict`].
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let created = new_user.into_active_model()?.insert(db).await?;
    info!("Created {} account {} ({})", created.role, created.id, created.email);
    Ok(created)
}

/// Finds a user by id.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by id, failing with [`Error::NotFound`].
pub async fn require_user<C>(conn: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Finds a user by email, case-insensitively.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All users with the given role, newest first.
pub async fn list_users_by_role(db: &DatabaseConnection, role: UserRole) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(role))
        .order_by_desc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fails with [`Error::Forbidden`] unless `actor` has `role`.
pub fn require_role(actor: &user::Model, role: UserRole, action: &str) -> Result<()> {
    if actor.role == role {
        Ok(())
    } else {
        Err(Error::forbidden(actor.role, action))
    }
}

async fn require_agent(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    let found = require_user(db, user_id).await?;
    if found.role != UserRole::DeliveryAgent {
        return Err(Error::validation(format!(
            "User {user_id} is not a Delivery Agent"
        )));
    }
    Ok(found)
}

/// Updates a delivery agent's profile. Other roles are rejected.
pub async fn update_agent(
    db: &DatabaseConnection,
    agent_id: i64,
    update: AgentUpdate,
) -> Result<user::Model> {
    let agent = require_agent(db, agent_id).await?;

    let mut active: user::ActiveModel = agent.into();
    active.full_name = Set(required(&update.full_name, "Full name")?);
    active.phone_number = Set(required(&update.phone_number, "Phone number")?);
    active.address = Set(trimmed_or_none(update.address));
    if let Some(hash) = update.password_hash.filter(|h| !h.trim().is_empty()) {
        active.password_hash = Set(hash);
    }

    let updated = active.update(db).await?;
    info!("Updated delivery agent {}", agent_id);
    Ok(updated)
}

/// Deletes a delivery agent.
///
/// Agents that still have deliveries assigned cannot be deleted; the database
/// reports that as [`Error::Conflict`].
pub async fn delete_agent(db: &DatabaseConnection, agent_id: i64) -> Result<()> {
    let agent = require_agent(db, agent_id).await?;
    agent.delete(db).await?;
    info!("Deleted delivery agent {}", agent_id);
    Ok(())
}
