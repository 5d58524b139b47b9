//! Incremental event retrieval for dashboard viewers.
//!
//! A viewer performs one full load, then bounded delta loads on a fixed
//! interval, merging each batch into a deduplicated, newest-first view
//! without ever re-fetching already-seen records.

pub mod api;
pub mod client;

pub use api::{EventsApi, HttpEventsApi};
pub use client::{SyncClient, SyncPhase, SyncSnapshot};
