//! Inbound event envelope parsing and validation.
//!
//! An [`EventEnvelope`] is the raw wire shape: everything is optional so
//! deserialization never fails on missing keys, and [`validate`] is the
//! single gate that turns it into a typed [`ParsedEvent`] or rejects it.
//! Validation is a pure function with no side effects; it runs once, before
//! any sink adapter is invoked.

use crate::core::{ChatBody, Destination, LogFields, ParsedEvent, SqlBody, ValidationError};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

/// The raw inbound envelope, one per request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    pub source: Option<String>,
    /// Requested sink kinds. Unknown values are ignored, not rejected.
    pub destination: Option<Vec<String>>,
    pub log: Option<RawLogBody>,
    pub chat: Option<RawChatBody>,
    pub sql: Option<RawSqlBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogBody {
    pub category: Option<String>,
    /// Wire key for the alert type is `alert`.
    #[serde(rename = "alert")]
    pub alert_type: Option<String>,
    pub severity: Option<String>,
    pub timestamp: Option<String>,
    pub message: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChatBody {
    pub destination: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSqlBody {
    pub destination: Option<String>,
    pub fields: Option<Vec<String>>,
}

/// Validates an envelope and extracts the normalized, typed fields.
///
/// Checks run in two stages, mirroring the API surface:
/// 1. Top-level pre-check: `source`, `destination`, and `log` must all be
///    present. Failure is reported generically, with no nested detail.
/// 2. Nested contracts: the five required log fields, plus the `chat` and
///    `sql` sub-objects when those destinations are requested. Failures
///    name every missing field.
///
/// `log.group` defaults to the empty string; `sql.fields` defaults to an
/// empty list (its absence is deliberately not fatal, unlike
/// `sql.destination`).
pub fn validate(envelope: EventEnvelope) -> Result<ParsedEvent, ValidationError> {
    let (Some(source), Some(raw_destinations), Some(log)) =
        (envelope.source, envelope.destination, envelope.log)
    else {
        return Err(ValidationError::MissingEnvelopeFields);
    };

    let mut destinations = BTreeSet::new();
    for value in &raw_destinations {
        match Destination::parse(value) {
            Some(kind) => {
                destinations.insert(kind);
            }
            None => debug!(destination = %value, "ignoring unknown destination"),
        }
    }

    let mut missing: Vec<&'static str> = Vec::new();

    let category = require(log.category, "log.category", &mut missing);
    let alert_type = require(log.alert_type, "log.alert", &mut missing);
    let severity = require(log.severity, "log.severity", &mut missing);
    let timestamp = require(log.timestamp, "log.timestamp", &mut missing);
    let message = require(log.message, "log.message", &mut missing);
    let group = log.group.unwrap_or_default();

    let chat = if destinations.contains(&Destination::Chat) {
        match envelope.chat {
            Some(chat) => {
                let destination = require(chat.destination, "chat.destination", &mut missing);
                let message = require(chat.message, "chat.message", &mut missing);
                Some(ChatBody {
                    destination,
                    message,
                })
            }
            None => {
                missing.push("chat");
                None
            }
        }
    } else {
        None
    };

    let sql = if destinations.contains(&Destination::Sql) {
        match envelope.sql {
            Some(sql) => {
                let destination = require(sql.destination, "sql.destination", &mut missing);
                Some(SqlBody {
                    destination,
                    fields: sql.fields.unwrap_or_default(),
                })
            }
            None => {
                missing.push("sql");
                None
            }
        }
    } else {
        None
    };

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(ParsedEvent {
        source,
        destinations,
        log: LogFields {
            category,
            alert_type,
            severity,
            timestamp,
            message,
            group,
        },
        chat,
        sql,
    })
}

fn require(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value {
        Some(value) => value,
        None => {
            missing.push(name);
            String::new()
        }
    }
}
