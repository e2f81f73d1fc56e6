//! The `store` adapter: writes validated events into the live alert store.

use crate::core::{Destination, NewAlert, ParsedEvent, SinkAdapter};
use crate::store::AlertStore;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::debug;

/// Inserts one [`crate::core::AlertRecord`] per delivered event and then
/// opportunistically purges expired records. There is no background timer;
/// retention is enforced on the write path.
pub struct StoreSink {
    store: Arc<AlertStore>,
    max_age: Duration,
}

impl StoreSink {
    pub fn new(store: Arc<AlertStore>, max_age: Duration) -> Self {
        Self { store, max_age }
    }
}

#[async_trait]
impl SinkAdapter for StoreSink {
    fn kind(&self) -> Destination {
        Destination::Store
    }

    async fn deliver(&self, event: &ParsedEvent) -> anyhow::Result<()> {
        let record = self.store.insert(NewAlert::from_event(event));
        let purged = self.store.purge_older_than(self.max_age);
        debug!(id = record.id, source = %record.source, purged, "stored alert");
        Ok(())
    }
}
