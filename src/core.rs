//! Core domain types and service traits for logrelay
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A sink kind an event envelope can request delivery to.
///
/// Unknown destination strings in an envelope are ignored, not rejected, so
/// this enum only ever holds the four known kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Destination {
    Store,
    Chat,
    Syslog,
    Sql,
}

impl Destination {
    /// The fixed fanout order. Not semantically required, but deterministic
    /// so dispatch traces are reproducible.
    pub const FANOUT_ORDER: [Destination; 4] = [
        Destination::Store,
        Destination::Chat,
        Destination::Syslog,
        Destination::Sql,
    ];

    /// Parses a destination string from the wire. Returns `None` for
    /// unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "store" => Some(Destination::Store),
            "chat" => Some(Destination::Chat),
            "syslog" => Some(Destination::Syslog),
            "sql" => Some(Destination::Sql),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Store => "store",
            Destination::Chat => "chat",
            Destination::Syslog => "syslog",
            Destination::Sql => "sql",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The validated, typed form of an inbound event envelope.
///
/// Produced by [`crate::envelope::validate`]; every field has passed the
/// per-destination contracts, so adapters can rely on e.g. `chat` being
/// `Some` whenever `Destination::Chat` is in the destination set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    /// Identifier of the emitting plugin/service.
    pub source: String,
    /// The known destinations this event requested, in canonical order.
    pub destinations: BTreeSet<Destination>,
    pub log: LogFields,
    pub chat: Option<ChatBody>,
    pub sql: Option<SqlBody>,
}

/// The five required log fields plus the optional group.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFields {
    pub category: String,
    pub alert_type: String,
    pub severity: String,
    pub timestamp: String,
    pub message: String,
    /// Empty string when the envelope carried no group.
    pub group: String,
}

/// Chat delivery details, present whenever `chat` is a requested destination.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatBody {
    /// Target channel/chat id.
    pub destination: String,
    pub message: String,
}

/// SQL delivery details, present whenever `sql` is a requested destination.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlBody {
    pub destination: String,
    /// Column/field list for the long-term record. May be empty; absence on
    /// the wire is not a validation failure.
    pub fields: Vec<String>,
}

/// An alert record as held by the live store, without an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub timestamp: String,
    pub source: String,
    pub group: String,
    pub category: String,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
}

impl NewAlert {
    /// Builds the record-to-insert from a validated event.
    pub fn from_event(event: &ParsedEvent) -> Self {
        Self {
            timestamp: event.log.timestamp.clone(),
            source: event.source.clone(),
            group: event.log.group.clone(),
            category: event.log.category.clone(),
            alert_type: event.log.alert_type.clone(),
            severity: event.log.severity.clone(),
            message: event.log.message.clone(),
        }
    }
}

/// One record in the live alert store.
///
/// Immutable once inserted; only ever removed by the retention purge.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertRecord {
    /// Monotonic id assigned on insert, strictly increasing with no gaps.
    pub id: u64,
    /// The client-supplied timestamp string, kept verbatim.
    pub timestamp: String,
    pub source: String,
    pub group: String,
    pub category: String,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    /// Server-side insertion time; retention purging keys on this, not on
    /// the client-supplied `timestamp`, so skewed or historical client
    /// clocks cannot expire their own records.
    #[serde(skip_serializing)]
    pub received_at: DateTime<Utc>,
}

/// Why an envelope was rejected. The HTTP surface collapses both variants
/// into the one fixed error body; the detail only goes to the log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One of the top-level `source`, `destination`, or `log` keys is
    /// absent. Reported generically, before any nested parsing.
    #[error("missing required fields")]
    MissingEnvelopeFields,
    /// Named nested fields are absent (e.g. `log.severity`, `chat.message`).
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Delivers validated events to one destination kind.
#[async_trait]
pub trait SinkAdapter: Send + Sync {
    /// The destination kind this adapter serves.
    fn kind(&self) -> Destination;

    /// Delivers one event to this adapter's destination.
    ///
    /// # Returns
    /// * `Ok(())` if the event was accepted by the destination
    /// * `Err` if delivery failed (network error, timeout, etc.). The
    ///   dispatcher logs the error and moves on; it is never surfaced to
    ///   the ingesting caller and never retried.
    async fn deliver(&self, event: &ParsedEvent) -> anyhow::Result<()>;
}
