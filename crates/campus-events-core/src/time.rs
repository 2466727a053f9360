//! Time classification for feed events.
//!
//! Feed timestamps are converted into a fixed IANA zone so that same-day
//! comparisons never depend on the host's local zone. This module provides:
//! - [`local_now`] / [`to_zone`]: zone-local instants
//! - [`ProximityWindows`] and [`ProximityFlags`]: the past/soon/in-progress predicates
//! - formatting helpers for event times and dates

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zone used when no other zone is configured.
pub const DEFAULT_ZONE: Tz = chrono_tz::America::Los_Angeles;

/// Text shown instead of a clock time for events starting at midnight.
pub const ALL_DAY: &str = "All Day";

/// Returns `instant` expressed in `zone`.
///
/// The result keeps the zone's offset, so its date components are the
/// zone-local calendar date.
pub fn local_now(instant: DateTime<Utc>, zone: Tz) -> DateTime<FixedOffset> {
    instant.with_timezone(&zone).fixed_offset()
}

/// Converts a timestamp from any zone into `zone`.
pub fn to_zone<Z: TimeZone>(dt: &DateTime<Z>, zone: Tz) -> DateTime<FixedOffset> {
    dt.with_timezone(&zone).fixed_offset()
}

/// Returns true if the time-of-day is exactly 00:00.
pub fn is_midnight(dt: &DateTime<FixedOffset>) -> bool {
    dt.hour() == 0 && dt.minute() == 0
}

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 12-hour format with AM/PM (e.g., "2:30 PM").
    #[default]
    H12,
    /// 24-hour format (e.g., "14:30").
    H24,
}

/// Formats the start time of an event.
///
/// Returns [`ALL_DAY`] when the time-of-day is midnight.
pub fn format_event_time(dt: &DateTime<FixedOffset>, format: TimeFormat) -> String {
    if is_midnight(dt) {
        return ALL_DAY.to_string();
    }
    match format {
        TimeFormat::H12 => dt.format("%-I:%M %p").to_string(),
        TimeFormat::H24 => dt.format("%H:%M").to_string(),
    }
}

/// Formats a short date such as `Mon, Oct 20 '25`.
pub fn format_date_short(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%a, %b %-d '%y").to_string()
}

/// Formats a long date such as `Monday, October 20, 2025`.
pub fn format_date_long(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%A, %B %-d, %Y").to_string()
}

/// Minute windows used by the proximity predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityWindows {
    /// Minutes after start after which a timed event counts as past.
    pub past_after_minutes: i64,
    /// Minutes before its start from which an event is "soon".
    pub soon_lead_minutes: i64,
    /// Minutes after its start during which an event is still "soon".
    pub soon_trail_minutes: i64,
    /// Minutes after start during which an event is in progress.
    pub in_progress_minutes: i64,
}

impl Default for ProximityWindows {
    fn default() -> Self {
        Self {
            past_after_minutes: 60,
            soon_lead_minutes: 60,
            soon_trail_minutes: 30,
            in_progress_minutes: 60,
        }
    }
}

impl ProximityWindows {
    /// Returns true if no instant can be both past and in progress.
    pub fn is_consistent(&self) -> bool {
        self.past_after_minutes >= self.in_progress_minutes
            && self.past_after_minutes >= 0
            && self.soon_lead_minutes >= 0
            && self.soon_trail_minutes >= 0
            && self.in_progress_minutes >= 0
    }

    /// Builder: set the in-progress window.
    pub fn with_in_progress(mut self, minutes: i64) -> Self {
        self.in_progress_minutes = minutes;
        self
    }

    /// Builder: set the soon window.
    pub fn with_soon(mut self, lead_minutes: i64, trail_minutes: i64) -> Self {
        self.soon_lead_minutes = lead_minutes;
        self.soon_trail_minutes = trail_minutes;
        self
    }

    /// Evaluates the three proximity predicates for an event.
    pub fn classify(
        &self,
        start: &DateTime<FixedOffset>,
        is_all_day: bool,
        now: &DateTime<FixedOffset>,
    ) -> ProximityFlags {
        let past_cutoff = *start + Duration::minutes(self.past_after_minutes);
        let in_progress_end = *start + Duration::minutes(self.in_progress_minutes);
        let soon_from = *start - Duration::minutes(self.soon_lead_minutes);
        let soon_until = *start + Duration::minutes(self.soon_trail_minutes);

        ProximityFlags {
            is_past: !is_all_day && past_cutoff < *now,
            is_soon: soon_from <= *now && *now <= soon_until,
            is_in_progress: *start <= *now && *now < in_progress_end,
        }
    }
}

/// Proximity of an event start to "now".
///
/// These are independent booleans used for visual emphasis; they are not a
/// single state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityFlags {
    pub is_past: bool,
    pub is_soon: bool,
    pub is_in_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacific(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        DEFAULT_ZONE
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .fixed_offset()
    }

    mod zone {
        use super::*;

        #[test]
        fn local_now_uses_zone_date() {
            // 05:30 UTC is still the previous evening in Los Angeles.
            let instant = Utc.with_ymd_and_hms(2025, 10, 21, 5, 30, 0).unwrap();
            let now = local_now(instant, DEFAULT_ZONE);
            assert_eq!(now.date_naive(), chrono::NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
            assert_eq!(now.hour(), 22);
        }

        #[test]
        fn to_zone_keeps_instant() {
            let utc = Utc.with_ymd_and_hms(2025, 1, 10, 17, 0, 0).unwrap();
            let local = to_zone(&utc, DEFAULT_ZONE);
            assert_eq!(local, utc);
            assert_eq!(local.hour(), 9);
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn all_day_iff_midnight() {
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 0, 0), TimeFormat::H12), "All Day");
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 0, 1), TimeFormat::H12), "12:01 AM");
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 12, 0), TimeFormat::H12), "12:00 PM");
        }

        #[test]
        fn twelve_hour_has_no_leading_zero() {
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 9, 5), TimeFormat::H12), "9:05 AM");
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 14, 30), TimeFormat::H12), "2:30 PM");
        }

        #[test]
        fn twenty_four_hour() {
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 9, 5), TimeFormat::H24), "09:05");
            assert_eq!(format_event_time(&pacific(2025, 10, 20, 0, 0), TimeFormat::H24), "All Day");
        }

        #[test]
        fn formatting_is_stable() {
            let dt = pacific(2025, 10, 20, 16, 15);
            let first = format_event_time(&dt, TimeFormat::H12);
            let second = format_event_time(&dt, TimeFormat::H12);
            assert_eq!(first, second);
        }

        #[test]
        fn dates() {
            let dt = pacific(2025, 10, 20, 16, 15);
            assert_eq!(format_date_short(&dt), "Mon, Oct 20 '25");
            assert_eq!(format_date_long(&dt), "Monday, October 20, 2025");
        }
    }

    mod proximity {
        use super::*;

        fn flags(start: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> ProximityFlags {
            ProximityWindows::default().classify(&start, is_midnight(&start), &now)
        }

        #[test]
        fn ten_minutes_into_event() {
            let f = flags(pacific(2025, 10, 20, 14, 0), pacific(2025, 10, 20, 14, 10));
            assert!(f.is_in_progress);
            assert!(!f.is_past);
            assert!(f.is_soon);
        }

        #[test]
        fn soon_window_is_inclusive_and_bounded() {
            let start = pacific(2025, 10, 20, 14, 0);
            assert!(flags(start, pacific(2025, 10, 20, 13, 0)).is_soon);
            assert!(!flags(start, pacific(2025, 10, 20, 12, 59)).is_soon);
            assert!(flags(start, pacific(2025, 10, 20, 14, 30)).is_soon);
            let f = flags(start, pacific(2025, 10, 20, 14, 31));
            assert!(!f.is_soon);
            assert!(f.is_in_progress);
        }

        #[test]
        fn in_progress_ends_after_an_hour() {
            let start = pacific(2025, 10, 20, 14, 0);
            assert!(flags(start, pacific(2025, 10, 20, 14, 31)).is_in_progress);
            assert!(flags(start, pacific(2025, 10, 20, 14, 59)).is_in_progress);
            assert!(!flags(start, pacific(2025, 10, 20, 15, 0)).is_in_progress);
            assert!(!flags(start, pacific(2025, 10, 20, 13, 59)).is_in_progress);
        }

        #[test]
        fn past_after_an_hour() {
            let start = pacific(2025, 10, 20, 14, 0);
            assert!(!flags(start, pacific(2025, 10, 20, 15, 0)).is_past);
            let f = flags(start, pacific(2025, 10, 20, 15, 1));
            assert!(f.is_past);
            assert!(!f.is_in_progress);
        }

        #[test]
        fn never_past_and_in_progress() {
            let start = pacific(2025, 10, 20, 14, 0);
            for minute in -120..240 {
                let now = start + Duration::minutes(minute);
                let f = flags(start, now);
                assert!(!(f.is_past && f.is_in_progress), "minute {minute}");
            }
        }

        #[test]
        fn all_day_is_never_past() {
            let start = pacific(2025, 10, 20, 0, 0);
            let f = flags(start, pacific(2025, 10, 20, 23, 0));
            assert!(!f.is_past);
            assert!(!f.is_in_progress);
            // evaluated against its midnight timestamp
            let f = flags(start, pacific(2025, 10, 20, 0, 20));
            assert!(f.is_in_progress);
            assert!(f.is_soon);
        }

        #[test]
        fn inconsistent_windows_are_detected() {
            assert!(ProximityWindows::default().is_consistent());
            assert!(!ProximityWindows::default().with_in_progress(90).is_consistent());
        }
    }
}
