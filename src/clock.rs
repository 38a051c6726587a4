use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::America::Chicago;
use chrono_tz::Tz;

/// All daily-challenge calendar arithmetic happens in this zone so that
/// every player shares the same day boundaries.
pub const REFERENCE_TZ: Tz = Chicago;

/// Day the first daily challenge went live; challenge #1
pub fn epoch_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 21).unwrap_or(NaiveDate::MIN)
}

/// Source of "now" for the ledger and analytics
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and headless runs. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    /// Clock reading `hour:minute` on `date` in the reference timezone
    pub fn at_reference(date: NaiveDate, hour: u32, minute: u32) -> Self {
        let naive = date.and_hms_opt(hour, minute, 0).unwrap_or_default();
        let local = REFERENCE_TZ
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive));
        Self::new(local)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Calendar date of `now` in the reference timezone
pub fn reference_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&REFERENCE_TZ).date_naive()
}

/// Whole calendar days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Daily challenge number for a reference-timezone date, never below 1
pub fn challenge_number(today: NaiveDate) -> u32 {
    let days = days_between(epoch_start(), today);
    (days + 1).max(1) as u32
}

/// Time left until the next reference-timezone midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCountdown {
    pub hours: i64,
    pub minutes: i64,
}

impl fmt::Display for ResetCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

pub fn time_until_reset(now: DateTime<Utc>) -> ResetCountdown {
    let today = reference_date(now);
    let next_midnight = today
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| REFERENCE_TZ.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now + Duration::hours(24));
    let diff = (next_midnight - now).max(Duration::zero());
    ResetCountdown {
        hours: diff.num_hours(),
        minutes: diff.num_minutes() % 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reference_date_ignores_utc_day() {
        // 03:30 UTC on Jan 10 is still the evening of Jan 9 in Chicago
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 3, 30, 0).unwrap();
        assert_eq!(reference_date(now), date(2025, 1, 9));
        let later = Utc.with_ymd_and_hms(2025, 1, 10, 6, 30, 0).unwrap();
        assert_eq!(reference_date(later), date(2025, 1, 10));
    }

    #[test]
    fn challenge_number_starts_at_one() {
        assert_eq!(challenge_number(epoch_start()), 1);
        assert_eq!(challenge_number(epoch_start().succ_opt().unwrap()), 2);
        assert_eq!(challenge_number(date(2020, 1, 1)), 1);
        assert_eq!(challenge_number(date(2025, 1, 1)), 12);
    }

    #[test]
    fn reset_countdown_to_reference_midnight() {
        let clock = ManualClock::at_reference(date(2025, 3, 1), 20, 15);
        let left = time_until_reset(clock.now());
        assert_eq!(left, ResetCountdown { hours: 3, minutes: 45 });
        assert_eq!(left.to_string(), "3h 45m");
    }

    #[test]
    fn reset_countdown_across_dst_change() {
        // Clocks spring forward on 2025-03-09 in Chicago; the next midnight
        // after 22:00 on the 8th is still two wall-clock hours away.
        let clock = ManualClock::at_reference(date(2025, 3, 8), 22, 0);
        assert_eq!(
            time_until_reset(clock.now()),
            ResetCountdown { hours: 2, minutes: 0 }
        );
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at_reference(date(2025, 5, 5), 9, 0);
        let handle = clock.clone();
        handle.advance(Duration::days(1));
        assert_eq!(reference_date(clock.now()), date(2025, 5, 6));
    }
}
