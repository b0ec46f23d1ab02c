//! ISO-8601 UTC timestamps with lexicographic = chronological ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp stored as an ISO-8601 string.
///
/// RFC 3339 with a fixed-width fractional-second representation sorts
/// lexicographically in the same order as chronologically — this is what
/// lets [`Message`](crate::message::Message) ordering and cursor comparisons
/// work as plain string comparisons on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp(String);

impl Timestamp {
    /// Capture the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Build from a `chrono` UTC datetime.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }

    /// Parse an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not a valid RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let dt: DateTime<Utc> = DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc);
        Ok(Self::from_datetime(dt))
    }

    /// The raw ISO-8601 string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse back into a `chrono` datetime.
    ///
    /// # Panics
    ///
    /// Panics if the stored string was not produced by this type (invariant
    /// upheld by the constructors above).
    #[must_use]
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&self.0)
            .expect("Timestamp always holds a valid RFC 3339 string")
            .with_timezone(&Utc)
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_order_matches_chronological_order() {
        let earlier = Timestamp::from_datetime(Utc::now());
        std::thread::sleep(std::time::Duration::from_millis(5));
        let later = Timestamp::now();
        assert!(earlier < later);
        assert!(earlier.as_str() < later.as_str());
    }

    #[test]
    fn round_trips_through_parse() {
        let ts = Timestamp::now();
        let parsed = Timestamp::parse(ts.as_str()).unwrap();
        assert_eq!(ts, parsed);
    }
}
