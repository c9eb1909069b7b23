//! Lenient wire parsing for instants.
//!
//! Clients send either a full RFC 3339 timestamp or a bare `YYYY-MM-DD`
//! date. A bare date means midnight UTC of that day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de};

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// `deserialize_with` helper for `Option<DateTime<Utc>>` fields.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse(&raw).map(Some).ok_or_else(|| {
        de::Error::custom(format!("invalid date `{raw}`: expected RFC 3339 or YYYY-MM-DD"))
    })
}
