use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-time classification of an item against a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// `expiry_date >= now`.
    Active,
    /// `expiry_date < now`.
    Expired,
}

/// Classify an expiry date against `now`.
///
/// The boundary is strict: an item expiring exactly at `now` is still active.
pub fn classify(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> ExpiryStatus {
    if expiry_date < now {
        ExpiryStatus::Expired
    } else {
        ExpiryStatus::Active
    }
}
