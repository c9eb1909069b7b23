//! Per-owner waste reports.
//!
//! Each report is a pure function over an owner's items and a reference
//! instant. Store backends with native aggregation must reproduce the same
//! bucketing and the ordering contract documented on [`rank_expired`]: count
//! descending, then name ascending.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Maximum number of entries in the top-expired report.
pub const TOP_EXPIRED_LIMIT: usize = 5;

/// Expired vs. active counts. Every item lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusSplit {
    /// Items with `expiry_date < now`.
    #[cfg_attr(feature = "openapi", schema(example = 2))]
    pub expired: u64,
    /// Items with `expiry_date >= now`.
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub active: u64,
}

impl StatusSplit {
    pub fn total(&self) -> u64 {
        self.expired + self.active
    }
}

/// Number of items that expired in one calendar month (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MonthlyWaste {
    #[cfg_attr(feature = "openapi", schema(example = 2024))]
    pub year: i32,
    /// Month of the year, 1 through 12.
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub month: u32,
    #[cfg_attr(feature = "openapi", schema(example = 2))]
    pub expired_count: u64,
}

/// How often items of a given name have expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExpiredItemCount {
    #[cfg_attr(feature = "openapi", schema(example = "Milk"))]
    pub item_name: String,
    #[cfg_attr(feature = "openapi", schema(example = 3))]
    pub count: u64,
}

/// The three reports, serialized under their chart names.
///
/// The reports are computed independently and, when backed by a live store,
/// may reflect slightly different snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Statistics {
    #[serde(rename = "pieChart")]
    pub status_split: StatusSplit,
    #[serde(rename = "lineChart")]
    pub monthly_trend: Vec<MonthlyWaste>,
    #[serde(rename = "barChart")]
    pub top_expired: Vec<ExpiredItemCount>,
}

impl Statistics {
    /// Compute all three reports from one set of items.
    pub fn compute(items: &[Item], now: DateTime<Utc>) -> Self {
        Self {
            status_split: status_split(items, now),
            monthly_trend: monthly_trend(items, now),
            top_expired: top_expired(items, now, TOP_EXPIRED_LIMIT),
        }
    }
}

/// Count expired and active items.
pub fn status_split<'a, I>(items: I, now: DateTime<Utc>) -> StatusSplit
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .fold(StatusSplit::default(), |mut split, item| {
            if item.is_expired(now) {
                split.expired += 1;
            } else {
                split.active += 1;
            }
            split
        })
}

/// Group expired items by the (year, month) of their expiry date.
///
/// The result is sparse and ascending: months without expired items do not
/// appear.
pub fn monthly_trend<'a, I>(items: I, now: DateTime<Utc>) -> Vec<MonthlyWaste>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for item in items.into_iter().filter(|item| item.is_expired(now)) {
        let key = (item.expiry_date.year(), item.expiry_date.month());
        *buckets.entry(key).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month), expired_count)| MonthlyWaste {
            year,
            month,
            expired_count,
        })
        .collect()
}

/// The `limit` item names that expired most often.
pub fn top_expired<'a, I>(items: I, now: DateTime<Utc>, limit: usize) -> Vec<ExpiredItemCount>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for item in items.into_iter().filter(|item| item.is_expired(now)) {
        *counts.entry(item.name.as_str()).or_insert(0) += 1;
    }
    rank_expired(
        counts.into_iter().map(|(name, count)| (name.to_owned(), count)),
        limit,
    )
}

/// Order `(name, count)` pairs by count descending, then name ascending, and
/// keep the first `limit`.
pub fn rank_expired<I>(counts: I, limit: usize) -> Vec<ExpiredItemCount>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| Reverse(a.1).cmp(&Reverse(b.1)).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);
    entries
        .into_iter()
        .map(|(item_name, count)| ExpiredItemCount { item_name, count })
        .collect()
}
