//! Backup identifiers
//!
//! Backups are named `<label->YYYYMMDD-HHMMSS.tar.gz`. The timestamp part is
//! the backup's identity; a rollback request names either that timestamp
//! exactly or a relative duration such as `2h`.

use std::fmt;

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

use crate::error::{NixlayerError, NixlayerResult};

/// `strftime` format of the timestamp part of a backup name.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Length of a formatted timestamp (`YYYYMMDD-HHMMSS`).
pub const TIMESTAMP_LEN: usize = 15;

/// Second-resolution local wall-clock instant identifying a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackupTimestamp(NaiveDateTime);

impl BackupTimestamp {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Parse `YYYYMMDD-HHMMSS`. Anything else (including trailing text) is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != TIMESTAMP_LEN {
            return None;
        }
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .ok()
            .map(Self)
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn next_second(self) -> Self {
        Self(self.0 + TimeDelta::seconds(1))
    }
}

impl fmt::Display for BackupTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

/// How a rollback request picks its backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackSelector {
    /// The backup with exactly this timestamp.
    Exact(BackupTimestamp),
    /// The most recent backup no older than `now - duration`.
    Within(TimeDelta),
}

impl RollbackSelector {
    pub fn parse(value: &str) -> NixlayerResult<Self> {
        let value = value.trim();
        if let Some(ts) = BackupTimestamp::parse(value) {
            return Ok(RollbackSelector::Exact(ts));
        }
        if let Some(duration) = parse_duration(value) {
            return Ok(RollbackSelector::Within(duration));
        }
        Err(NixlayerError::validation(
            "backup",
            format!(
                "'{value}' is neither a backup timestamp (YYYYMMDD-HHMMSS) nor a duration like 30m, 2h or 1d"
            ),
        ))
    }

    /// Earliest acceptable timestamp for `Within`, relative to `now`.
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            RollbackSelector::Exact(_) => None,
            RollbackSelector::Within(duration) => now.checked_sub_signed(*duration),
        }
    }
}

/// Parse `<n><unit>` with unit `s`, `m`, `h`, `d` or `w`.
pub fn parse_duration(value: &str) -> Option<TimeDelta> {
    let value = value.trim();
    let unit = value.chars().last()?;
    let amount: i64 = value[..value.len() - unit.len_utf8()].parse().ok()?;
    if amount < 0 {
        return None;
    }
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        'w' => 7 * 24 * 60 * 60,
        _ => return None,
    };
    TimeDelta::try_seconds(amount.checked_mul(multiplier)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn timestamp_formats_and_parses() {
        let ts = BackupTimestamp::new(at(10, 15, 0));
        assert_eq!(ts.to_string(), "20261017-101500");
        assert_eq!(BackupTimestamp::parse("20261017-101500"), Some(ts));
    }

    #[test]
    fn timestamp_rejects_other_shapes() {
        assert_eq!(BackupTimestamp::parse("2026-10-17"), None);
        assert_eq!(BackupTimestamp::parse("20261017-101500x"), None);
        assert_eq!(BackupTimestamp::parse("20261317-101500"), None);
    }

    #[test]
    fn timestamp_drops_subseconds() {
        let with_nanos = at(10, 15, 0).with_nanosecond(123_456).unwrap();
        assert_eq!(BackupTimestamp::new(with_nanos), BackupTimestamp::new(at(10, 15, 0)));
    }

    #[test]
    fn next_second_rolls_over() {
        let ts = BackupTimestamp::new(at(10, 59, 59)).next_second();
        assert_eq!(ts.to_string(), "20261017-110000");
    }

    #[test]
    fn durations_parse() {
        assert_eq!(parse_duration("2h"), Some(TimeDelta::hours(2)));
        assert_eq!(parse_duration("30m"), Some(TimeDelta::minutes(30)));
        assert_eq!(parse_duration("1d"), Some(TimeDelta::days(1)));
        assert_eq!(parse_duration("1w"), Some(TimeDelta::weeks(1)));
        assert_eq!(parse_duration("45s"), Some(TimeDelta::seconds(45)));
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("2y"), None);
        assert_eq!(parse_duration("-2h"), None);
    }

    #[test]
    fn selector_prefers_exact_timestamps() {
        assert_eq!(
            RollbackSelector::parse("20261017-101500").unwrap(),
            RollbackSelector::Exact(BackupTimestamp::new(at(10, 15, 0)))
        );
        assert_eq!(
            RollbackSelector::parse("2h").unwrap(),
            RollbackSelector::Within(TimeDelta::hours(2))
        );
        assert!(RollbackSelector::parse("yesterday").is_err());
    }

    #[test]
    fn cutoff_subtracts_duration() {
        let selector = RollbackSelector::Within(TimeDelta::hours(2));
        assert_eq!(selector.cutoff(at(12, 0, 0)), Some(at(10, 0, 0)));
    }
}
