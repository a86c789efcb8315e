// crates/catalog-core/src/core/time.rs
// ============================================================================
// Module: Service Catalog Time Helpers
// Description: Wall-clock helpers for record and event timestamps.
// Purpose: Keep timestamp representation consistent across stores and sinks.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Timestamps are unix milliseconds in an `i64`, shared by records and events.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Returns the current unix epoch in milliseconds.
///
/// Clocks before the epoch read as zero; far-future clocks saturate.
#[must_use]
pub fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
