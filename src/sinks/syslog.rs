//! The `syslog` adapter.
//!
//! Forwarding to a syslog endpoint has no wire contract defined yet. This
//! adapter satisfies the sink contract so the dispatcher and its tests are
//! unaffected by which adapters are real: it accepts the call, logs one
//! line, and does nothing else observable.

use crate::core::{Destination, ParsedEvent, SinkAdapter};
use async_trait::async_trait;
use tracing::info;

pub struct SyslogSink;

#[async_trait]
impl SinkAdapter for SyslogSink {
    fn kind(&self) -> Destination {
        Destination::Syslog
    }

    async fn deliver(&self, event: &ParsedEvent) -> anyhow::Result<()> {
        info!(
            source = %event.source,
            severity = %event.log.severity,
            "syslog delivery not implemented yet, dropping event"
        );
        Ok(())
    }
}
