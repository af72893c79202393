//! Unified error types and result handling.

use crate::entities::{DeliveryStatus, OrderStatus, UserRole};
use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Every failure the service can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Startup configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// A unique or foreign-key constraint rejected the write
    #[error("Constraint violation: {message}")]
    Conflict {
        /// Driver message
        message: String,
    },

    /// I/O failure (config files, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lookup by id found nothing
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record, e.g. `"Order"`
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// Input failed validation
    #[error("{message}")]
    Validation {
        /// User-facing explanation
        message: String,
    },

    /// Quantity outside 1 to 999
    #[error("Quantity must be between 1 and 999, got {quantity}")]
    InvalidQuantity {
        /// Rejected quantity
        quantity: i64,
    },

    /// Negative price
    #[error("Price must not be negative, got {price}")]
    InvalidPrice {
        /// Rejected price
        price: Decimal,
    },

    /// The transition table does not allow this move
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Delivery action out of sequence (e.g. drop before pickup)
    #[error("Delivery is {current:?}, expected {expected:?}")]
    InvalidDeliveryState {
        /// Current delivery status
        current: DeliveryStatus,
        /// Status the action requires
        expected: DeliveryStatus,
    },

    /// Actor lacks the role or ownership for the action
    #[error("{role} may not {action}")]
    Forbidden {
        /// Actor's role
        role: UserRole,
        /// What was attempted
        action: String,
    },

    /// No acting user could be identified
    #[error("Authentication required")]
    Unauthenticated,

    /// Restaurant is not taking orders
    #[error("Restaurant {id} is inactive")]
    RestaurantInactive {
        /// Restaurant id
        id: i64,
    },

    /// Menu item cannot be ordered right now
    #[error("Menu item {id} is unavailable")]
    ItemUnavailable {
        /// Menu item id
        id: i64,
    },

    /// Checkout with nothing to order
    #[error("Cart is empty")]
    EmptyCart,

    /// Every cart line was invalid at checkout
    #[error("No valid items to checkout")]
    NoValidItems,
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(
                SqlErr::UniqueConstraintViolation(message)
                | SqlErr::ForeignKeyConstraintViolation(message),
            ) => Self::Conflict { message },
            _ => Self::Database(err),
        }
    }
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    pub fn forbidden(role: UserRole, action: impl Into<String>) -> Self {
        Self::Forbidden {
            role,
            action: action.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
