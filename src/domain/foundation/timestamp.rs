//! UTC instants recorded on sessions, contexts and interactions.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant. Serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wraps a stored instant, e.g. a database column.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whole milliseconds from `earlier` to this instant, floored at zero.
    ///
    /// Clock skew between writers can put `earlier` after `self`; that
    /// reads as no time elapsed rather than a negative span.
    pub fn millis_since(&self, earlier: &Timestamp) -> u64 {
        let millis = self.0.signed_duration_since(earlier.0).num_milliseconds();
        u64::try_from(millis).unwrap_or(0)
    }

    /// RFC 3339 with millisecond precision, for API payloads.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_datetime(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
    }

    #[test]
    fn millis_since_measures_forward_span() {
        assert_eq!(at(3).millis_since(&at(1)), 2_000);
    }

    #[test]
    fn millis_since_floors_skew_at_zero() {
        assert_eq!(at(1).millis_since(&at(3)), 0);
    }

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::now();
        let later = Timestamp::from_datetime(*earlier.as_datetime() + Duration::milliseconds(5));
        assert!(earlier < later);
    }

    #[test]
    fn rfc3339_uses_zulu_and_millis() {
        assert_eq!(at(0).to_rfc3339(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn round_trips_through_json() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T10:30:00.000Z");
    }
}
