use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::Tz;
use regex::Regex;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

static NOTIFY_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\d?):?(\d\d)$").expect("valid notify time regex"));

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// The weekday at `now` in the given timezone. Unset or unknown timezones
/// fall back to UTC.
pub fn local_weekday(timezone: Option<&str>, now: DateTime<Utc>) -> Weekday {
    match timezone.and_then(parse_timezone) {
        Some(tz) => now.with_timezone(&tz).weekday(),
        None => now.weekday(),
    }
}

/// Parse a 24-hour time like `13:30`, `9:05` or `0930` into minutes after
/// midnight.
pub fn parse_notify_time(input: &str) -> Option<u32> {
    let caps = NOTIFY_TIME_RE.captures(input.trim())?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Format minutes after midnight as `HH:MM`
pub fn format_notify_time(minutes_after_midnight: u32) -> String {
    format!(
        "{:02}:{:02}",
        (minutes_after_midnight / 60) % 24,
        minutes_after_midnight % 60
    )
}
