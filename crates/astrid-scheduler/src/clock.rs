//! Cron/interval fire-time arithmetic (§4.H, §6 "standard 5-field cron
//! syntax; interval schedules as integer seconds"), grounded in the
//! original host's `periodic.py` (`croniter.is_valid` gating a stored
//! schedule string before it's trusted).
//!
//! `cron` (the crate) speaks Quartz-style six-field expressions with a
//! leading seconds column; the wire format this host stores is the more
//! common five-field form, so every string is parsed with an implicit
//! `"0 "` seconds prefix.

use std::str::FromStr;

use astrid_core::{ScheduleKind, Timestamp};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::{SchedulerError, SchedulerResult};

/// The current instant, for callers that need `now` independent of any
/// particular schedule's timezone (storage always compares in UTC).
#[must_use]
pub fn now() -> Timestamp {
    Timestamp::now()
}

/// Resolve the scheduler's configured timezone, defaulting to UTC.
///
/// # Errors
///
/// Returns [`SchedulerError::UnknownTimezone`] if `override_name` is set
/// but not a recognized IANA zone.
pub fn resolve_timezone(override_name: Option<&str>) -> SchedulerResult<Tz> {
    match override_name {
        None => Ok(Tz::UTC),
        Some(name) => name.parse::<Tz>().map_err(|_| SchedulerError::UnknownTimezone(name.to_string())),
    }
}

/// Validate that `value` is well-formed for `kind`, without computing a
/// fire time. Used at task/job creation to reject a bad schedule at the
/// admin boundary (§7 "Configuration" error category) instead of letting
/// it fail silently on the first tick.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidSchedule`] if `value` doesn't parse.
pub fn validate(kind: ScheduleKind, value: &str) -> SchedulerResult<()> {
    match kind {
        ScheduleKind::Cron => parse_cron(value).map(|_| ()),
        ScheduleKind::Interval => parse_interval(value).map(|_| ()),
    }
}

/// Compute the next fire time strictly after `after`, interpreting cron
/// schedules in `tz`. Fixed-interval schedules ignore `tz` — they are
/// simply `after + interval`.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidSchedule`] if `value` doesn't parse
/// for `kind`, or [`SchedulerError::Exhausted`] if a cron schedule yields
/// no upcoming instant (practically unreachable).
pub fn next_run_after(kind: ScheduleKind, value: &str, after: &Timestamp, tz: Tz) -> SchedulerResult<Timestamp> {
    match kind {
        ScheduleKind::Cron => {
            let schedule = parse_cron(value)?;
            let after_tz = after.to_datetime().with_timezone(&tz);
            let next = schedule
                .after(&after_tz)
                .next()
                .ok_or_else(|| SchedulerError::Exhausted(value.to_string()))?;
            Ok(Timestamp::from_datetime(next.with_timezone(&Utc)))
        },
        ScheduleKind::Interval => {
            let seconds = parse_interval(value)?;
            let next: DateTime<Utc> = after.to_datetime() + chrono::Duration::seconds(seconds);
            Ok(Timestamp::from_datetime(next))
        },
    }
}

fn parse_cron(value: &str) -> SchedulerResult<Schedule> {
    let six_field = format!("0 {value}");
    Schedule::from_str(&six_field).map_err(|e| SchedulerError::InvalidSchedule {
        kind: ScheduleKind::Cron,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_interval(value: &str) -> SchedulerResult<i64> {
    let seconds: i64 = value.parse().map_err(|_| SchedulerError::InvalidSchedule {
        kind: ScheduleKind::Interval,
        value: value.to_string(),
        reason: "not an integer number of seconds".to_string(),
    })?;
    if seconds <= 0 {
        return Err(SchedulerError::InvalidSchedule {
            kind: ScheduleKind::Interval,
            value: value.to_string(),
            reason: "interval must be positive".to_string(),
        });
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_five_field_cron_string_parses_via_the_seconds_prefix() {
        assert!(validate(ScheduleKind::Cron, "0 9 * * MON-FRI").is_ok());
    }

    #[test]
    fn a_malformed_cron_string_is_rejected() {
        assert!(validate(ScheduleKind::Cron, "not a cron string").is_err());
    }

    #[test]
    fn an_interval_must_be_a_positive_integer() {
        assert!(validate(ScheduleKind::Interval, "60").is_ok());
        assert!(validate(ScheduleKind::Interval, "0").is_err());
        assert!(validate(ScheduleKind::Interval, "soon").is_err());
    }

    #[test]
    fn interval_schedules_advance_by_exactly_the_interval() {
        let after = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let next = next_run_after(ScheduleKind::Interval, "3600", &after, Tz::UTC).unwrap();
        assert_eq!(next.to_datetime(), after.to_datetime() + chrono::Duration::hours(1));
    }

    #[test]
    fn cron_schedules_advance_to_the_next_matching_instant_strictly_after_now() {
        let after = Timestamp::parse("2026-01-01T09:00:00Z").unwrap();
        let next = next_run_after(ScheduleKind::Cron, "0 9 * * *", &after, Tz::UTC).unwrap();
        assert_eq!(next.to_datetime().date_naive(), after.to_datetime().date_naive().succ_opt().unwrap());
    }
}
