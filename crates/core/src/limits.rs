//! Size and pacing limits for the pipeline.

/// Maximum serialized metadata size per envelope (16KB).
pub const MAX_METADATA_BYTES: usize = 16 * 1024;

/// Page size for queries without a `since` bound (most recent events).
pub const DEFAULT_QUERY_LIMIT: usize = 20;

/// Dashboard delta-poll interval in seconds.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Visible-text cap for auto-tracked click properties.
pub const CLICK_TEXT_MAX_CHARS: usize = 100;
