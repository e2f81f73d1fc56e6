//! The `sql` adapter.
//!
//! Long-term SQL storage has no wire contract defined yet. Like the syslog
//! stub, this adapter accepts the call, logs one line, and does nothing else
//! observable, so the dispatcher treats it uniformly with the real sinks.

use crate::core::{Destination, ParsedEvent, SinkAdapter};
use async_trait::async_trait;
use tracing::{debug, info};

pub struct SqlSink;

#[async_trait]
impl SinkAdapter for SqlSink {
    fn kind(&self) -> Destination {
        Destination::Sql
    }

    async fn deliver(&self, event: &ParsedEvent) -> anyhow::Result<()> {
        // Validation guarantees the sql body whenever sql is requested, but
        // an empty field list is allowed through and only worth a debug line.
        if let Some(sql) = &event.sql {
            if sql.fields.is_empty() {
                debug!(source = %event.source, "sql body carries no fields");
            }
            info!(
                source = %event.source,
                table = %sql.destination,
                fields = sql.fields.len(),
                "sql delivery not implemented yet, dropping event"
            );
        }
        Ok(())
    }
}
