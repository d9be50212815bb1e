//! Time-of-day index in milliseconds from midnight.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

pub const HOUR_MILLIS: i64 = 3_600_000;
pub const MINUTE_MILLIS: i64 = 60_000;
pub const SECOND_MILLIS: i64 = 1_000;

/// Millisecond timestamp counted from midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TimeIndex(i64);

impl TimeIndex {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Build from whole seconds
    pub fn of(hour: i64, minute: i64, second: i64) -> Self {
        Self(hour * HOUR_MILLIS + minute * MINUTE_MILLIS + second * SECOND_MILLIS)
    }

    /// Build from fractional seconds, rounded to the nearest millisecond
    pub fn of_fractional(hour: i64, minute: i64, second: f64) -> Self {
        let second_millis = (second * SECOND_MILLIS as f64).round() as i64;
        Self(hour * HOUR_MILLIS + minute * MINUTE_MILLIS + second_millis)
    }

    /// Parse `HH:MM:SS` or `HH:MM:SS.fff`
    pub fn parse(raw: &str) -> Option<Self> {
        let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S%.f").ok()?;
        let millis = time.num_seconds_from_midnight() as i64 * SECOND_MILLIS
            + (time.nanosecond() / 1_000_000) as i64;
        Some(Self(millis))
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    pub fn hour(&self) -> i64 {
        self.0 / HOUR_MILLIS
    }

    pub fn minute(&self) -> i64 {
        (self.0 % HOUR_MILLIS) / MINUTE_MILLIS
    }

    /// Milliseconds within the current minute
    pub fn second_millis(&self) -> i64 {
        self.0 % MINUTE_MILLIS
    }
}

impl From<i64> for TimeIndex {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl std::fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let second_millis = self.second_millis();
        if second_millis % SECOND_MILLIS == 0 {
            write!(
                f,
                "hour:{} minute:{} second:{}",
                self.hour(),
                self.minute(),
                second_millis / SECOND_MILLIS
            )
        } else {
            write!(
                f,
                "hour:{} minute:{} second:{:.3}",
                self.hour(),
                self.minute(),
                second_millis as f64 / SECOND_MILLIS as f64
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_components() {
        assert_eq!(TimeIndex::of(1, 2, 3).millis(), 3_723_000);
        assert_eq!(TimeIndex::of_fractional(0, 0, 1.2346).millis(), 1_235);
        assert_eq!(TimeIndex::of_fractional(0, 0, 0.0004).millis(), 0);
    }

    #[test]
    fn test_render() {
        assert_eq!(TimeIndex::of(16, 40, 5).to_string(), "hour:16 minute:40 second:5");
        assert_eq!(
            TimeIndex::of_fractional(16, 40, 5.25).to_string(),
            "hour:16 minute:40 second:5.250"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(TimeIndex::parse("16:40:00"), Some(TimeIndex::of(16, 40, 0)));
        assert_eq!(
            TimeIndex::parse("00:00:01.5"),
            Some(TimeIndex::new(1_500))
        );
        assert_eq!(TimeIndex::parse("25:00:00"), None);
        assert_eq!(TimeIndex::parse("noon"), None);
    }
}
