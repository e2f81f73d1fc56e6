/// logrelay - A log/alert ingestion and fanout service
///
/// This library provides the core functionality for ingesting structured
/// log/alert events from plugins and services, validating them, and fanning
/// each event out to the requested sinks (live alert store, chat webhook,
/// syslog, SQL).
pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod server;
pub mod sinks;
pub mod store;

pub mod core;

// Re-export core types for convenience
pub use crate::core::*;
