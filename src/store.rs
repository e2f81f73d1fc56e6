//! The live alert store.
//!
//! Holds a bounded-by-age, in-memory collection of [`AlertRecord`]s and
//! answers filtered, paginated, counted queries for the dashboard. The store
//! is an explicitly owned instance shared between the dispatcher and the
//! query handler; all access goes through one mutex, so id assignment,
//! purging, and reads serialize against each other. Nothing inside the lock
//! ever touches the network or awaits.

use crate::core::{AlertRecord, NewAlert};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Query criteria for [`AlertStore::count`] and [`AlertStore::query`].
///
/// Every criterion is optional: an empty string matches everything, and all
/// non-empty criteria are combined with logical AND. `search` is a
/// case-insensitive substring match against `message`, `source`, and
/// `category`; the remaining criteria are exact matches on their field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub search: String,
    pub source: String,
    pub group: String,
    pub category: String,
    pub alert_type: String,
    pub severity: String,
}

impl AlertFilter {
    pub fn matches(&self, record: &AlertRecord) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = record.message.to_lowercase().contains(&needle)
                || record.source.to_lowercase().contains(&needle)
                || record.category.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        exact(&self.source, &record.source)
            && exact(&self.group, &record.group)
            && exact(&self.category, &record.category)
            && exact(&self.alert_type, &record.alert_type)
            && exact(&self.severity, &record.severity)
    }
}

fn exact(criterion: &str, field: &str) -> bool {
    criterion.is_empty() || criterion == field
}

struct StoreInner {
    next_id: u64,
    /// Insertion order, oldest at the front.
    records: VecDeque<AlertRecord>,
}

/// In-memory, mutex-guarded store of recent alerts.
pub struct AlertStore {
    inner: Mutex<StoreInner>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                next_id: 1,
                records: VecDeque::new(),
            }),
        }
    }

    /// A panicking caller must not wedge the store for everyone else, so a
    /// poisoned lock is recovered rather than propagated. Records are only
    /// ever appended or popped whole, so the inner state stays consistent.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one record, assigning the next id. Ids are strictly
    /// increasing with no gaps, even under concurrent callers. The
    /// insertion time is read after the lock is taken, so ids and
    /// `received_at` agree with commit order.
    pub fn insert(&self, alert: NewAlert) -> AlertRecord {
        let mut inner = self.lock();
        let received_at = Utc::now();
        Self::append(&mut inner, alert, received_at)
    }

    /// Test hook: inserts a record with an explicit `received_at`, so
    /// retention behavior can be exercised without waiting out the clock.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn insert_at(&self, alert: NewAlert, received_at: DateTime<Utc>) -> AlertRecord {
        let mut inner = self.lock();
        Self::append(&mut inner, alert, received_at)
    }

    fn append(
        inner: &mut StoreInner,
        alert: NewAlert,
        received_at: DateTime<Utc>,
    ) -> AlertRecord {
        let record = AlertRecord {
            id: inner.next_id,
            timestamp: alert.timestamp,
            source: alert.source,
            group: alert.group,
            category: alert.category,
            alert_type: alert.alert_type,
            severity: alert.severity,
            message: alert.message,
            received_at,
        };
        inner.next_id += 1;
        inner.records.push_back(record.clone());
        record
    }

    /// Removes every record received before `now - max_age` and returns how
    /// many were removed. Idempotent; one pass over the live records.
    pub fn purge_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut inner = self.lock();
        let before = inner.records.len();
        // Records are nearly in received_at order, but the wall clock can
        // step backwards between inserts, so every record is checked rather
        // than stopping at the first unexpired one.
        inner.records.retain(|record| record.received_at >= cutoff);
        let removed = before - inner.records.len();
        if removed > 0 {
            debug!(removed, remaining = inner.records.len(), "purged expired alerts");
        }
        removed
    }

    /// Number of records matching `filter`.
    pub fn count(&self, filter: &AlertFilter) -> usize {
        let inner = self.lock();
        inner
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .count()
    }

    /// Records matching `filter`, newest first, skipping `offset` and
    /// returning at most `limit`. Ordering is the reverse of insertion
    /// order, consistent with [`AlertStore::count`], so pagination over a
    /// fixed snapshot is stable.
    pub fn query(&self, filter: &AlertFilter, offset: usize, limit: usize) -> Vec<AlertRecord> {
        let inner = self.lock();
        inner
            .records
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}
