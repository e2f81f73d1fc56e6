//! Sink adapters, one per destination kind.
//!
//! Every adapter implements [`crate::core::SinkAdapter`], so the dispatcher
//! treats the in-process store write, the outbound chat webhook, and the
//! not-yet-implemented syslog/SQL stubs uniformly.

pub mod chat;
pub mod sql;
pub mod store;
pub mod syslog;

pub use chat::{ChatClient, ChatClientTrait, ChatSink};
pub use sql::SqlSink;
pub use store::StoreSink;
pub use syslog::SyslogSink;
