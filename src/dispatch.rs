//! Validate-then-fanout orchestration.
//!
//! The dispatcher owns the mapping from [`Destination`] to the adapter that
//! serves it. Validation is the only hard gate: an invalid envelope is
//! rejected before any adapter runs. Once an event is valid, delivery to each
//! requested destination is best-effort and isolated, so one failing sink
//! never aborts its siblings and never changes the caller-visible outcome.

use crate::core::{Destination, ParsedEvent, SinkAdapter, ValidationError};
use crate::envelope::{self, EventEnvelope};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Observability-only record of what one fanout attempted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Destinations an adapter was invoked for, in fanout order.
    pub attempted: Vec<Destination>,
    /// The subset of `attempted` whose adapter returned an error.
    pub failed: Vec<Destination>,
}

pub struct Dispatcher {
    adapters: HashMap<Destination, Arc<dyn SinkAdapter>>,
}

impl Dispatcher {
    /// Builds a dispatcher from the configured adapters, keyed by the kind
    /// each adapter reports. Adding a destination means adding one
    /// [`Destination`] variant and one adapter.
    pub fn new(adapters: Vec<Arc<dyn SinkAdapter>>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.kind(), adapter))
                .collect(),
        }
    }

    /// Validates an envelope and, if it passes, fans it out.
    ///
    /// `Err` means the envelope was rejected and no adapter ran. `Ok` means
    /// the event was accepted; sink-level failures are only visible in the
    /// returned outcome and the log.
    pub async fn dispatch(
        &self,
        envelope: EventEnvelope,
    ) -> Result<DispatchOutcome, ValidationError> {
        let event = envelope::validate(envelope).inspect_err(|error| {
            metrics::counter!("ingest_validation_failures").increment(1);
            warn!(%error, "rejected event envelope");
        })?;
        metrics::counter!("ingest_events_accepted").increment(1);
        Ok(self.fan_out(&event).await)
    }

    /// Invokes the adapter for each requested destination, in the fixed
    /// order `store, chat, syslog, sql`. Adapter errors are logged at warn
    /// with enough context to diagnose without replay, and swallowed.
    pub async fn fan_out(&self, event: &ParsedEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        for kind in Destination::FANOUT_ORDER {
            if !event.destinations.contains(&kind) {
                continue;
            }
            let Some(adapter) = self.adapters.get(&kind) else {
                debug!(destination = %kind, "no adapter configured, skipping");
                continue;
            };
            outcome.attempted.push(kind);
            if let Err(error) = adapter.deliver(event).await {
                metrics::counter!("sink_delivery_failures", "sink" => kind.as_str())
                    .increment(1);
                warn!(
                    source = %event.source,
                    destination = %kind,
                    %error,
                    "sink delivery failed"
                );
                outcome.failed.push(kind);
            }
        }
        outcome
    }
}
