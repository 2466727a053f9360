//! Day-relative bucketing of events.
//!
//! Given today's zone-local date `D` and a rolling window of `W` days, every
//! event lands in exactly one of:
//!
//! | bucket | rule |
//! |---|---|
//! | `earlier_today` | day == D and past |
//! | `upcoming_today` | day == D and not past |
//! | `tomorrow` | day == D+1 |
//! | `upcoming` | D+1 < day <= D+W, grouped by day |
//! | dropped | anything else |

use std::collections::BTreeMap;

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::Event;
use crate::time::ProximityWindows;

/// Default rolling window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 10;

/// Events of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

/// Which bucket an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    EarlierToday,
    UpcomingToday,
    Tomorrow,
    Upcoming,
    Dropped,
}

/// The bucketed events of one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSet {
    /// The zone-local "now" the buckets were computed against.
    pub as_of: DateTime<FixedOffset>,
    pub earlier_today: Vec<Event>,
    pub upcoming_today: Vec<Event>,
    pub tomorrow: Vec<Event>,
    /// Events after tomorrow, one group per day in ascending order.
    pub upcoming: Vec<DayGroup>,
    /// Number of events outside the window.
    pub dropped: usize,
}

impl BucketSet {
    /// Creates an empty bucket set, used when a feed could not be loaded.
    pub fn empty(as_of: DateTime<FixedOffset>) -> Self {
        Self {
            as_of,
            earlier_today: Vec::new(),
            upcoming_today: Vec::new(),
            tomorrow: Vec::new(),
            upcoming: Vec::new(),
            dropped: 0,
        }
    }

    /// Returns the number of retained events.
    pub fn len(&self) -> usize {
        self.earlier_today.len()
            + self.upcoming_today.len()
            + self.tomorrow.len()
            + self.upcoming.iter().map(|g| g.events.len()).sum::<usize>()
    }

    /// Returns true if no event was retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions events into [`BucketSet`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucketizer {
    window_days: u32,
    windows: ProximityWindows,
}

impl Default for Bucketizer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, ProximityWindows::default())
    }
}

impl Bucketizer {
    /// Creates a bucketizer. A window shorter than one day is widened to one,
    /// so that tomorrow is always shown.
    pub fn new(window_days: u32, windows: ProximityWindows) -> Self {
        Self {
            window_days: window_days.max(1),
            windows,
        }
    }

    /// Returns the rolling window length in days.
    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Decides the bucket of a single event.
    pub fn classify(&self, event: &Event, now: &DateTime<FixedOffset>) -> Bucket {
        let today = now.date_naive();
        let day = event.day();

        if day == today {
            if event.flags(now, &self.windows).is_past {
                Bucket::EarlierToday
            } else {
                Bucket::UpcomingToday
            }
        } else if Some(day) == today.checked_add_days(Days::new(1)) {
            Bucket::Tomorrow
        } else if day > today
            && today
                .checked_add_days(Days::new(u64::from(self.window_days)))
                .is_some_and(|last| day <= last)
        {
            Bucket::Upcoming
        } else {
            Bucket::Dropped
        }
    }

    /// Partitions `events` relative to `now`.
    ///
    /// Every bucket is chronologically ordered; events with equal start times
    /// keep their input order.
    pub fn bucketize(&self, events: &[Event], now: DateTime<FixedOffset>) -> BucketSet {
        let mut sorted: Vec<&Event> = events.iter().collect();
        sorted.sort_by_key(|e| e.start);

        let mut set = BucketSet::empty(now);
        let mut upcoming: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();

        for event in sorted {
            match self.classify(event, &now) {
                Bucket::EarlierToday => set.earlier_today.push(event.clone()),
                Bucket::UpcomingToday => set.upcoming_today.push(event.clone()),
                Bucket::Tomorrow => set.tomorrow.push(event.clone()),
                Bucket::Upcoming => upcoming.entry(event.day()).or_default().push(event.clone()),
                Bucket::Dropped => set.dropped += 1,
            }
        }

        set.upcoming = upcoming
            .into_iter()
            .map(|(date, events)| DayGroup { date, events })
            .collect();

        debug!(
            earlier_today = set.earlier_today.len(),
            upcoming_today = set.upcoming_today.len(),
            tomorrow = set.tomorrow.len(),
            upcoming_days = set.upcoming.len(),
            dropped = set.dropped,
            "Bucketized events"
        );

        set
    }
}
