//! View models for the event page.
//!
//! Rendering is a pure projection from [`BucketSet`]s to serializable view
//! models. Presentation layers (the text renderer in [`crate::format`], or a
//! web front end consuming the JSON form) only bind these structures.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::bucket::{BucketSet, DayGroup};
use crate::event::{Event, FeedId};
use crate::sanitize::strip_tags;
use crate::time::{
    ProximityFlags, ProximityWindows, TimeFormat, format_date_long, format_date_short,
    format_event_time,
};

/// Message shown under a mandatory list without events.
pub const NO_EVENTS_MESSAGE: &str = "No scheduled events.";

/// Message shown when the page could not be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load events";

/// Options for projecting events into view models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub time_format: TimeFormat,
    pub windows: ProximityWindows,
    /// Message for empty mandatory lists.
    pub empty_message: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            windows: ProximityWindows::default(),
            empty_message: NO_EVENTS_MESSAGE.to_string(),
        }
    }
}

/// Static description of a page section (one per feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMeta {
    pub feed: FeedId,
    pub title: String,
    pub description: String,
    /// Link of the section heading.
    pub link: String,
}

impl SectionMeta {
    pub fn new(feed: impl Into<FeedId>, title: impl Into<String>) -> Self {
        Self {
            feed: feed.into(),
            title: title.into(),
            description: String::new(),
            link: String::new(),
        }
    }

    /// Builder method to set the intro text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the heading link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

/// The lists of a section, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    EarlierToday,
    Today,
    Tomorrow,
    Upcoming,
}

impl ListKind {
    /// Returns the list heading.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::EarlierToday => "Earlier Today",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::Upcoming => "Upcoming",
        }
    }

    /// Mandatory lists are shown with a placeholder message when empty.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Today | Self::Tomorrow)
    }
}

/// One event, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    /// Stable id within the page, used by the disclosure state.
    pub id: String,
    pub title: String,
    pub time: String,
    pub date: String,
    pub link: String,
    /// Sanitized HTML description.
    pub description: String,
    /// Description with tags stripped.
    pub plain_text: String,
    pub location: String,
    pub flags: ProximityFlags,
    pub start: DateTime<FixedOffset>,
    pub visible: bool,
}

/// Events of one day, with an optional date header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroupView {
    pub date: NaiveDate,
    pub header: Option<String>,
    pub events: Vec<EventView>,
    pub visible: bool,
}

/// One list of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListView {
    pub kind: ListKind,
    pub heading: String,
    pub groups: Vec<DayGroupView>,
    /// Placeholder shown instead of groups when the list is empty.
    pub empty_message: Option<String>,
    pub visible: bool,
}

impl ListView {
    /// Iterates over every event of the list.
    pub fn events(&self) -> impl Iterator<Item = &EventView> {
        self.groups.iter().flat_map(|g| g.events.iter())
    }
}

/// A rendered feed section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionView {
    pub meta: SectionMeta,
    pub lists: Vec<ListView>,
}

impl SectionView {
    /// Returns the list of the given kind, if rendered.
    pub fn list(&self, kind: ListKind) -> Option<&ListView> {
        self.lists.iter().find(|l| l.kind == kind)
    }

    /// Iterates over every event of the section.
    pub fn events(&self) -> impl Iterator<Item = &EventView> {
        self.lists.iter().flat_map(|l| l.events())
    }
}

/// The whole page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub heading: String,
    /// Long form of today's date.
    pub date_line: String,
    /// Announcement shown above the sections.
    pub announcement: Option<String>,
    /// Error banner; when set, sections are hidden.
    pub error: Option<String>,
    pub sections: Vec<SectionView>,
}

impl PageView {
    /// Creates a page for the given local "now".
    pub fn new(heading: impl Into<String>, now: &DateTime<FixedOffset>) -> Self {
        Self {
            heading: heading.into(),
            date_line: format_date_long(now),
            announcement: None,
            error: None,
            sections: Vec::new(),
        }
    }

    /// Returns true if sections should be displayed.
    pub fn shows_sections(&self) -> bool {
        self.error.is_none()
    }
}

/// Projects a single event.
pub fn project_event(
    id: String,
    event: &Event,
    now: &DateTime<FixedOffset>,
    options: &ViewOptions,
) -> EventView {
    EventView {
        id,
        title: event.title.clone(),
        time: format_event_time(&event.start, options.time_format),
        date: format_date_short(&event.start),
        link: event.link.clone(),
        description: event.description.clone(),
        plain_text: strip_tags(&event.description),
        location: event.location_or_default().to_string(),
        flags: event.flags(now, &options.windows),
        start: event.start,
        visible: true,
    }
}

/// Projects the buckets of one feed into a section.
///
/// Lists appear in the order Earlier Today, Today, Tomorrow, Upcoming.
/// Today and Tomorrow are always present; the others only when non-empty.
pub fn project_section(meta: SectionMeta, buckets: &BucketSet, options: &ViewOptions) -> SectionView {
    let now = buckets.as_of;
    let today = now.date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);
    let mut counter = 0usize;
    let mut next_id = |feed: &FeedId| {
        counter += 1;
        format!("{feed}-{counter}")
    };

    let mut flat_group = |date: NaiveDate, events: &[Event]| DayGroupView {
        date,
        header: None,
        events: events
            .iter()
            .map(|e| project_event(next_id(&meta.feed), e, &now, options))
            .collect(),
        visible: true,
    };

    let earlier = flat_group(today, &buckets.earlier_today);
    let upcoming_today = flat_group(today, &buckets.upcoming_today);
    let tomorrow_group = flat_group(tomorrow, &buckets.tomorrow);
    let day_groups: Vec<DayGroupView> = buckets
        .upcoming
        .iter()
        .map(|group| project_day_group(group, &mut next_id, &meta.feed, &now, options))
        .collect();

    let mut lists = Vec::new();
    for (kind, groups) in [
        (ListKind::EarlierToday, vec![earlier]),
        (ListKind::Today, vec![upcoming_today]),
        (ListKind::Tomorrow, vec![tomorrow_group]),
        (ListKind::Upcoming, day_groups),
    ] {
        let groups: Vec<DayGroupView> = groups.into_iter().filter(|g| !g.events.is_empty()).collect();
        if groups.is_empty() && !kind.is_mandatory() {
            continue;
        }
        let empty_message = groups.is_empty().then(|| options.empty_message.clone());
        lists.push(ListView {
            kind,
            heading: kind.heading().to_string(),
            groups,
            empty_message,
            visible: true,
        });
    }

    SectionView { meta, lists }
}

fn project_day_group(
    group: &DayGroup,
    next_id: &mut impl FnMut(&FeedId) -> String,
    feed: &FeedId,
    now: &DateTime<FixedOffset>,
    options: &ViewOptions,
) -> DayGroupView {
    let header = now
        .offset()
        .from_local_datetime(&group.date.and_time(NaiveTime::MIN))
        .single()
        .map(|midnight| format_date_long(&midnight));

    DayGroupView {
        date: group.date,
        header,
        events: group
            .events
            .iter()
            .map(|e| project_event(next_id(feed), e, now, options))
            .collect(),
        visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucketizer;

    fn at(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, d, h, m, 0)
            .unwrap()
    }

    fn meta() -> SectionMeta {
        SectionMeta::new("general", "Events at Clark College")
            .with_description("Campus events happening today and tomorrow.")
            .with_link("https://www.example.edu/events.php")
    }

    fn section(events: &[Event], now: DateTime<FixedOffset>) -> SectionView {
        let buckets = Bucketizer::default().bucketize(events, now);
        project_section(meta(), &buckets, &ViewOptions::default())
    }

    fn kinds(section: &SectionView) -> Vec<ListKind> {
        section.lists.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn empty_feed_shows_mandatory_placeholders() {
        let view = section(&[], at(20, 9, 0));
        assert_eq!(kinds(&view), vec![ListKind::Today, ListKind::Tomorrow]);
        for list in &view.lists {
            assert!(list.groups.is_empty());
            assert_eq!(list.empty_message.as_deref(), Some(NO_EVENTS_MESSAGE));
        }
    }

    #[test]
    fn all_lists_in_order() {
        let events = vec![
            Event::new("Upcoming fair", at(24, 10, 0)),
            Event::new("Breakfast", at(20, 7, 0)),
            Event::new("Workshop", at(20, 14, 0)),
            Event::new("Seminar", at(21, 11, 0)),
        ];
        let view = section(&events, at(20, 14, 10));
        assert_eq!(
            kinds(&view),
            vec![ListKind::EarlierToday, ListKind::Today, ListKind::Tomorrow, ListKind::Upcoming]
        );

        let today = view.list(ListKind::Today).unwrap();
        let workshop = today.events().next().unwrap();
        assert_eq!(workshop.time, "2:00 PM");
        assert_eq!(workshop.date, "Mon, Oct 20 '25");
        assert!(workshop.flags.is_in_progress);
        assert!(today.empty_message.is_none());

        let upcoming = view.list(ListKind::Upcoming).unwrap();
        assert_eq!(upcoming.groups[0].header.as_deref(), Some("Friday, October 24, 2025"));
    }

    #[test]
    fn ids_are_unique_and_prefixed() {
        let events = vec![
            Event::new("A", at(20, 10, 0)),
            Event::new("B", at(21, 10, 0)),
            Event::new("C", at(25, 10, 0)),
        ];
        let view = section(&events, at(20, 8, 0));
        let ids: Vec<&str> = view.events().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["general-1", "general-2", "general-3"]);
    }

    #[test]
    fn plain_text_and_location() {
        let event = Event::new("A", at(20, 10, 0))
            .with_description("<b>Room</b> 12")
            .with_location(None);
        let view = project_event("x".into(), &event, &at(20, 8, 0), &ViewOptions::default());
        assert_eq!(view.plain_text, "Room 12");
        assert_eq!(view.location, "Location not specified");
    }

    #[test]
    fn page_defaults() {
        let page = PageView::new("Clark College Events", &at(20, 8, 0));
        assert_eq!(page.date_line, "Monday, October 20, 2025");
        assert!(page.shows_sections());
    }
}
