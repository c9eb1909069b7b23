use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::Item;

/// A per-owner view mapping item names to expiry dates.
///
/// Names are the map key, so items sharing a name collapse into one entry and
/// the one seen last wins. Stores list an owner's items in creation order,
/// which makes the most recently added item the survivor. This is a known
/// limitation of the name-keyed view, kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dashboard {
    items: BTreeMap<String, DateTime<Utc>>,
}

/// The owner has no items at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no items found for this user")]
pub struct EmptyDashboard;

impl Dashboard {
    /// Build the name-to-expiry mapping.
    ///
    /// An empty input is an error rather than an empty dashboard.
    pub fn build<'a, I>(items: I) -> Result<Self, EmptyDashboard>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let dashboard = Self {
            items: items
                .into_iter()
                .map(|item| (item.name.clone(), item.expiry_date))
                .collect(),
        };
        if dashboard.is_empty() {
            return Err(EmptyDashboard);
        }
        Ok(dashboard)
    }

    pub fn get(&self, name: &str) -> Option<DateTime<Utc>> {
        self.items.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
