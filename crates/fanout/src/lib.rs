//! Live push fan-out for the telemetry pipeline.
//!
//! Newly ingested events are broadcast to connected viewers through a
//! [`NotificationBus`]. The bus interface does not assume a single process;
//! [`InMemoryBus`] is the implementation for single-process deployments, and
//! a message-broker-backed implementation is the extension point for
//! multi-process fan-out.

pub mod bus;
pub mod memory;

pub use bus::{BroadcastOutcome, NotificationBus, SubscriberId, Subscription};
pub use memory::InMemoryBus;
