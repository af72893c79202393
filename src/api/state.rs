//! Shared handler state.

use crate::core::cart::CartStore;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Cloned into every handler by axum.
#[derive(Clone)]
pub struct AppState {
    /// Database pool
    pub db: DatabaseConnection,
    /// Pending carts keyed by user id
    pub carts: Arc<CartStore>,
}

impl AppState {
    /// Wraps a connection with an empty cart store.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            carts: Arc::new(CartStore::new()),
        }
    }
}
