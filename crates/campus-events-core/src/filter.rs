//! Text filtering and cross-feed search.
//!
//! Both use the same matching rule: a case-insensitive substring match of the
//! trimmed query against an event's title, time, date and plain-text
//! description. Queries shorter than the minimum length do not filter at all
//! (list filter) or match nothing (search).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{Event, FeedId};
use crate::view::{EventView, SectionMeta, SectionView, ViewOptions, project_event};

/// Default minimum query length, in characters.
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// A normalized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMatcher {
    needle: String,
}

impl EventMatcher {
    /// Builds a matcher, or `None` if the trimmed query is shorter than
    /// `min_len` characters.
    pub fn new(query: &str, min_len: usize) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.chars().count() < min_len {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// Returns the normalized needle.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Matches any of the given fields.
    pub fn matches_fields<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        fields
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Matches a projected event.
    pub fn matches(&self, event: &EventView) -> bool {
        self.matches_fields([
            event.title.as_str(),
            event.time.as_str(),
            event.date.as_str(),
            event.plain_text.as_str(),
        ])
    }
}

/// Applies a list filter to a section in place.
///
/// With no effective query every element is visible again. Otherwise an event
/// is visible iff it matches; a day group iff one of its events is visible;
/// a list iff one of its groups is visible.
///
/// Returns the number of visible events.
pub fn apply_filter(section: &mut SectionView, query: &str, min_len: usize) -> usize {
    let matcher = EventMatcher::new(query, min_len);
    let mut shown = 0;

    for list in &mut section.lists {
        let mut list_visible = false;
        for group in &mut list.groups {
            let mut group_visible = false;
            for event in &mut group.events {
                event.visible = matcher.as_ref().is_none_or(|m| m.matches(event));
                group_visible |= event.visible;
                shown += usize::from(event.visible);
            }
            group.visible = group_visible;
            list_visible |= group_visible;
        }
        // Placeholder lists only show while unfiltered.
        list.visible = list_visible || matcher.is_none();
    }

    debug!(
        feed = %section.meta.feed,
        filtered = matcher.is_some(),
        shown,
        "Applied list filter"
    );
    shown
}

/// The unbucketed events of one feed, as loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvents {
    pub meta: SectionMeta,
    pub events: Vec<Event>,
}

/// Search hits of one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGroup {
    pub feed: FeedId,
    pub title: String,
    pub events: Vec<EventView>,
}

/// Results of a cross-feed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub groups: Vec<SearchGroup>,
}

impl SearchResults {
    /// Returns the total number of hits.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.events.len()).sum()
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Searches every event of every feed, regardless of day window.
///
/// Hits are grouped per feed in feed order and sorted by start within a feed.
/// Feeds without hits are omitted.
pub fn search(
    feeds: &[FeedEvents],
    query: &str,
    min_len: usize,
    now: &DateTime<FixedOffset>,
    options: &ViewOptions,
) -> SearchResults {
    let mut results = SearchResults {
        query: query.trim().to_string(),
        groups: Vec::new(),
    };
    let Some(matcher) = EventMatcher::new(query, min_len) else {
        return results;
    };

    for feed in feeds {
        let mut sorted: Vec<&Event> = feed.events.iter().collect();
        sorted.sort_by_key(|e| e.start);

        let events: Vec<EventView> = sorted
            .into_iter()
            .enumerate()
            .map(|(i, e)| project_event(format!("{}-search-{}", feed.meta.feed, i + 1), e, now, options))
            .filter(|view| matcher.matches(view))
            .collect();

        if !events.is_empty() {
            results.groups.push(SearchGroup {
                feed: feed.meta.feed.clone(),
                title: feed.meta.title.clone(),
                events,
            });
        }
    }

    debug!(query = %results.query, hits = results.len(), "Search completed");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucketizer;
    use crate::view::{ListKind, project_section};
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, d, h, m, 0)
            .unwrap()
    }

    fn events() -> Vec<Event> {
        vec![
            Event::new("Chemistry Lab Tour", at(20, 10, 0)),
            Event::new("Book Club", at(20, 15, 0)).with_description("<p>Reading <b>Dune</b></p>"),
            Event::new("Career Fair", at(21, 9, 0)),
            Event::new("Chess Night", at(25, 18, 0)),
        ]
    }

    fn section() -> SectionView {
        let buckets = Bucketizer::default().bucketize(&events(), at(20, 8, 0));
        project_section(
            SectionMeta::new("general", "Events"),
            &buckets,
            &ViewOptions::default(),
        )
    }

    mod matcher {
        use super::*;

        #[test]
        fn short_queries_are_ignored() {
            assert!(EventMatcher::new("ab", 3).is_none());
            assert!(EventMatcher::new("  ab  ", 3).is_none());
            assert!(EventMatcher::new("abc", 3).is_some());
        }

        #[test]
        fn counts_characters_not_bytes() {
            assert!(EventMatcher::new("éé", 3).is_none());
            assert!(EventMatcher::new("ééé", 3).is_some());
        }

        #[test]
        fn case_insensitive() {
            let m = EventMatcher::new(" CHESS ", 3).unwrap();
            assert_eq!(m.needle(), "chess");
            assert!(m.matches_fields(["Chess Night"]));
            assert!(!m.matches_fields(["Book Club", ""]));
        }
    }

    mod list_filter {
        use super::*;

        #[test]
        fn matches_description_text() {
            let mut view = section();
            let shown = apply_filter(&mut view, "dune", 3);
            assert_eq!(shown, 1);
            let visible: Vec<&str> = view
                .events()
                .filter(|e| e.visible)
                .map(|e| e.title.as_str())
                .collect();
            assert_eq!(visible, vec!["Book Club"]);
        }

        #[test]
        fn hides_lists_and_groups_without_hits() {
            let mut view = section();
            apply_filter(&mut view, "chess", 3);
            assert!(!view.list(ListKind::Today).unwrap().visible);
            assert!(!view.list(ListKind::Tomorrow).unwrap().visible);
            let upcoming = view.list(ListKind::Upcoming).unwrap();
            assert!(upcoming.visible);
            assert!(upcoming.groups[0].visible);
        }

        #[test]
        fn hides_day_groups_without_hits() {
            let mut events = events();
            events.push(Event::new("Pottery Workshop", at(23, 11, 0)));
            let buckets = Bucketizer::default().bucketize(&events, at(20, 8, 0));
            let mut view = project_section(
                SectionMeta::new("general", "Events"),
                &buckets,
                &ViewOptions::default(),
            );

            apply_filter(&mut view, "chess", 3);
            let upcoming = view.list(ListKind::Upcoming).unwrap();
            assert!(upcoming.visible);
            let groups: Vec<_> = upcoming.groups.iter().map(|g| (g.date.to_string(), g.visible)).collect();
            assert_eq!(
                groups,
                vec![("2025-10-23".to_string(), false), ("2025-10-25".to_string(), true)]
            );
        }

        #[test]
        fn matches_formatted_time() {
            let mut view = section();
            assert_eq!(apply_filter(&mut view, "3:00 PM", 3), 1);
        }

        #[test]
        fn short_query_restores_everything() {
            let mut view = section();
            apply_filter(&mut view, "chess", 3);
            let shown = apply_filter(&mut view, "ch", 3);
            assert_eq!(shown, 4);
            assert!(view.lists.iter().all(|l| l.visible));
            assert!(view.events().all(|e| e.visible));
        }
    }

    mod cross_feed {
        use super::*;

        fn feeds() -> Vec<FeedEvents> {
            vec![
                FeedEvents {
                    meta: SectionMeta::new("general", "Events at Clark College"),
                    events: events(),
                },
                FeedEvents {
                    meta: SectionMeta::new("training", "Training Events"),
                    events: vec![
                        Event::new("Canvas Basics", at(22, 13, 0)),
                        Event::new("Career Coaching", at(1, 9, 0)),
                    ],
                },
            ]
        }

        #[test]
        fn groups_hits_per_feed() {
            let results = search(&feeds(), "car", 3, &at(20, 8, 0), &ViewOptions::default());
            assert_eq!(results.len(), 2);
            let titles: Vec<(&str, Vec<&str>)> = results
                .groups
                .iter()
                .map(|g| (g.feed.as_str(), g.events.iter().map(|e| e.title.as_str()).collect()))
                .collect();
            assert_eq!(
                titles,
                vec![
                    ("general", vec!["Career Fair"]),
                    ("training", vec!["Career Coaching"]),
                ]
            );
        }

        #[test]
        fn search_ignores_day_window() {
            let results = search(&feeds(), "coaching", 3, &at(20, 8, 0), &ViewOptions::default());
            assert_eq!(results.len(), 1);
            assert!(results.groups[0].events[0].flags.is_past);
        }

        #[test]
        fn short_query_returns_nothing() {
            let results = search(&feeds(), "ca", 3, &at(20, 8, 0), &ViewOptions::default());
            assert!(results.is_empty());
            assert!(results.groups.is_empty());
        }
    }
}
