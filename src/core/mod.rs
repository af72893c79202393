//! Core business logic - framework-agnostic order lifecycle, catalog and cart operations.
//!
//! Nothing in here knows about HTTP. Every public operation takes a database
//! connection and the acting user (where authorization matters) and returns a
//! crate [`Result`](crate::errors::Result).

/// Shopping cart value type, validation and in-process store
pub mod cart;
/// Admin overview counts
pub mod dashboard;
/// Delivery assignment, pickup/drop and location pings
pub mod delivery;
/// Advisory ETA display strings
pub mod eta;
/// Order status transition table and history log
pub mod lifecycle;
/// Owner-scoped menu management and menu browsing
pub mod menu;
/// Checkout, order queries and status changes
pub mod order;
/// Restaurant administration and search
pub mod restaurant;
/// First-run database seeding
pub mod seed;
/// Account management
pub mod user;

/// Trims a free-form optional field, mapping blank input to `None`.
pub(crate) fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a required field, failing with a validation error naming it when blank.
pub(crate) fn required(value: &str, field: &str) -> crate::errors::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::errors::Error::validation(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(trimmed.to_string())
}
