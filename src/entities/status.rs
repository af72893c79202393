//! String-valued status columns shared by several tables.
//!
//! Every enum is stored as its human-readable label (e.g. `"Out for Delivery"`),
//! which is also the form accepted and produced by the JSON API.

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role tag carried by every user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum UserRole {
    /// Manages restaurants, agents and all orders
    #[sea_orm(string_value = "Admin")]
    Admin,
    /// Browses menus and places orders
    #[sea_orm(string_value = "Customer")]
    Customer,
    /// Picks up and drops off orders
    #[sea_orm(string_value = "Delivery Agent")]
    #[serde(rename = "Delivery Agent")]
    DeliveryAgent,
    /// Owns restaurants, manages menus, accepts orders
    #[sea_orm(string_value = "Restaurant Owner")]
    #[serde(rename = "Restaurant Owner")]
    RestaurantOwner,
}

/// Whether a restaurant is currently taking orders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RestaurantStatus {
    /// Visible to customers and orderable
    #[sea_orm(string_value = "Active")]
    Active,
    /// Hidden from customers; checkout is refused
    #[sea_orm(string_value = "Inactive")]
    Inactive,
}

/// Menu item category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum MenuCategory {
    /// Food
    #[sea_orm(string_value = "Food")]
    Food,
    /// Drink
    #[sea_orm(string_value = "Drink")]
    Drink,
}

/// Order lifecycle status.
///
/// Variants are declared in lifecycle order; [`OrderStatus::rank`] exposes that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
    /// Created at checkout
    #[sea_orm(string_value = "Placed")]
    Placed,
    /// Restaurant accepted the order
    #[sea_orm(string_value = "Accepted")]
    Accepted,
    /// Kitchen is preparing the order
    #[sea_orm(string_value = "Preparing")]
    Preparing,
    /// Agent picked the order up
    #[sea_orm(string_value = "Out for Delivery")]
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    /// Agent dropped the order off
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    /// Cancelled by customer, owner or admin
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Delivery assignment status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum DeliveryStatus {
    /// Agent assigned, not yet picked up
    #[sea_orm(string_value = "Assigned")]
    Assigned,
    /// Agent has the order
    #[sea_orm(string_value = "Pickup")]
    Pickup,
    /// Order handed to the customer
    #[sea_orm(string_value = "Dropped")]
    Dropped,
}

/// How the customer pays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[sea_orm(string_value = "COD")]
    #[serde(rename = "COD")]
    Cod,
    /// Paid online at checkout
    #[sea_orm(string_value = "Online")]
    Online,
}

impl UserRole {
    /// Label stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Customer => "Customer",
            Self::DeliveryAgent => "Delivery Agent",
            Self::RestaurantOwner => "Restaurant Owner",
        }
    }
}

impl OrderStatus {
    /// Label stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Accepted => "Accepted",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position along the forward path. `Cancelled` sorts last.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Placed => 0,
            Self::Accepted => 1,
            Self::Preparing => 2,
            Self::OutForDelivery => 3,
            Self::Delivered => 4,
            Self::Cancelled => 5,
        }
    }

    /// Delivered and Cancelled orders never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| crate::errors::Error::Validation {
                message: format!("Unknown order status '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_order_status_parses_stored_labels() {
        for status in OrderStatus::iter() {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(status.to_value(), status.as_str());
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_display_labels() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for Delivery\"");
        let role: UserRole = serde_json::from_str("\"Delivery Agent\"").unwrap();
        assert_eq!(role, UserRole::DeliveryAgent);
        let method: PaymentMethod = serde_json::from_str("\"COD\"").unwrap();
        assert_eq!(method, PaymentMethod::Cod);
    }
}
