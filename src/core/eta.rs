//! ETA display - an advisory "how long until it arrives" string for tracking pages.
//!
//! Nothing is scheduled from these values. An admin-set expected drop time wins;
//! otherwise a fixed per-status offset from the placement time is used.

use crate::entities::{OrderStatus, delivery_assignment, order};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Label and detail text shown next to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eta {
    /// Always `"ETA"`
    pub label: &'static str,
    /// Human-readable estimate
    pub detail: String,
}

impl Eta {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            label: "ETA",
            detail: detail.into(),
        }
    }
}

/// Minutes after placement an order in `status` is expected to arrive.
#[must_use]
pub const fn fallback_offset_minutes(status: OrderStatus) -> i64 {
    match status {
        OrderStatus::Accepted => 40,
        OrderStatus::Preparing => 30,
        OrderStatus::OutForDelivery => 15,
        OrderStatus::Placed | OrderStatus::Delivered | OrderStatus::Cancelled => 45,
    }
}

/// Whole minutes from `now` until `target`, rounded down.
fn minutes_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (target - now).num_seconds().div_euclid(60)
}

/// Estimates when `order` will arrive, as seen at `now`.
#[must_use]
pub fn estimate_eta(
    order: &order::Model,
    delivery: Option<&delivery_assignment::Model>,
    now: DateTime<Utc>,
) -> Eta {
    if order.status.is_terminal() {
        return Eta::new("—");
    }

    if let Some(expected) = delivery.and_then(|d| d.expected_drop_at) {
        let mins = minutes_until(expected, now);
        return if mins <= 0 {
            Eta::new("Any moment now")
        } else {
            Eta::new(format!("{mins} min"))
        };
    }

    let target = order.placed_at + Duration::minutes(fallback_offset_minutes(order.status));
    let mins = minutes_until(target, now);
    if mins <= 0 {
        Eta::new("Soon")
    } else {
        Eta::new(format!("{mins} min (estimated)"))
    }
}
