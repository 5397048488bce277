//! Timestamp utilities

use chrono::{DateTime, Utc};
use tracing::warn;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a timestamp stored as RFC 3339 text
///
/// Falls back to the Unix epoch for unparseable values so that a single
/// corrupt row never blocks loading a comparison group. Such a row sorts
/// first in its group, so the fallback is logged.
pub fn parse_stored(s: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!("Unparseable stored timestamp '{}' ({}), using epoch", s, e);
            DateTime::<Utc>::default()
        }
    }
}
