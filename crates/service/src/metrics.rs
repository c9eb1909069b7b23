use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking service operations.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    /// Items created.
    pub items_added: AtomicU64,
    /// Items edited.
    pub items_edited: AtomicU64,
    /// Items deleted.
    pub items_deleted: AtomicU64,
    /// Dashboards served.
    pub dashboards: AtomicU64,
    /// Statistics reports served.
    pub statistics: AtomicU64,
    /// Requests rejected by validation.
    pub validation_failures: AtomicU64,
    /// Requests for unknown items or empty dashboards.
    pub not_found: AtomicU64,
    /// Store failures.
    pub store_errors: AtomicU64,
}

impl ServiceMetrics {
    pub fn increment_items_added(&self) {
        self.items_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_items_edited(&self) {
        self.items_edited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_items_deleted(&self) {
        self.items_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dashboards(&self) {
        self.dashboards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_statistics(&self) {
        self.statistics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_errors(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_added: self.items_added.load(Ordering::Relaxed),
            items_edited: self.items_edited.load(Ordering::Relaxed),
            items_deleted: self.items_deleted.load(Ordering::Relaxed),
            dashboards: self.dashboards.load(Ordering::Relaxed),
            statistics: self.statistics.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ServiceMetrics`] at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MetricsSnapshot {
    pub items_added: u64,
    pub items_edited: u64,
    pub items_deleted: u64,
    pub dashboards: u64,
    pub statistics: u64,
    pub validation_failures: u64,
    pub not_found: u64,
    pub store_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_zero() {
        assert_eq!(ServiceMetrics::default().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn increment_and_snapshot() {
        let m = ServiceMetrics::default();
        m.increment_items_added();
        m.increment_items_added();
        m.increment_items_deleted();
        m.increment_not_found();

        let snap = m.snapshot();
        assert_eq!(snap.items_added, 2);
        assert_eq!(snap.items_deleted, 1);
        assert_eq!(snap.not_found, 1);
        assert_eq!(snap.items_edited, 0);
        assert_eq!(snap.store_errors, 0);
    }
}
