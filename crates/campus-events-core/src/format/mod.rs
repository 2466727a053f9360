//! Text and JSON output for the event page.
//!
//! The text formatter binds [`PageView`] and [`SearchResults`] to plain
//! terminal output. Elements whose `visible` flag is cleared by the list
//! filter are skipped. JSON output is the serde form of the same view models.
//!
//! # Example
//!
//! ```rust
//! use campus_events_core::format::{TextFormatter, TextOptions};
//! use campus_events_core::disclosure::Disclosure;
//! use campus_events_core::view::PageView;
//! use chrono::{FixedOffset, TimeZone};
//!
//! let now = FixedOffset::west_opt(7 * 3600)
//!     .unwrap()
//!     .with_ymd_and_hms(2025, 10, 20, 9, 0, 0)
//!     .unwrap();
//! let page = PageView::new("Clark College Events", &now);
//! let text = TextFormatter::new(TextOptions::default()).format_page(&page, &Disclosure::Closed);
//! assert_eq!(text, "Clark College Events\nMonday, October 20, 2025");
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::disclosure::Disclosure;
use crate::filter::SearchResults;
use crate::view::{EventView, PageView, SectionView};

const LIST_INDENT: &str = "  ";
const GROUP_INDENT: &str = "    ";
const NESTED_GROUP_INDENT: &str = "      ";
const TIME_WIDTH: usize = 8;

/// The output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration options for text output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Maximum length for event titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Whether to wrap titles in OSC8 hyperlinks.
    pub hyperlinks: bool,
    /// Show every description, not only the disclosed one.
    pub expand_all: bool,
}

/// Renders view models as terminal text.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    options: TextOptions,
}

impl TextFormatter {
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }

    /// Renders the whole page.
    ///
    /// When the page carries an error, the banner replaces every section.
    pub fn format_page(&self, page: &PageView, disclosure: &Disclosure) -> String {
        let mut lines = vec![page.heading.clone(), page.date_line.clone()];

        if let Some(announcement) = &page.announcement {
            lines.push(String::new());
            lines.push(announcement.clone());
        }

        if let Some(error) = &page.error {
            lines.push(String::new());
            lines.push(error.clone());
            return lines.join("\n");
        }

        for section in &page.sections {
            lines.push(String::new());
            self.push_section(&mut lines, section, disclosure);
        }

        lines.join("\n")
    }

    fn push_section(&self, lines: &mut Vec<String>, section: &SectionView, disclosure: &Disclosure) {
        lines.push(section.meta.title.clone());
        if !section.meta.description.is_empty() {
            lines.push(section.meta.description.clone());
        }

        for list in section.lists.iter().filter(|l| l.visible) {
            lines.push(format!("{LIST_INDENT}{}", list.heading));
            if let Some(message) = &list.empty_message {
                lines.push(format!("{GROUP_INDENT}{message}"));
            }
            for group in list.groups.iter().filter(|g| g.visible) {
                let indent = match &group.header {
                    Some(header) => {
                        lines.push(format!("{GROUP_INDENT}{header}"));
                        NESTED_GROUP_INDENT
                    }
                    None => GROUP_INDENT,
                };
                for event in group.events.iter().filter(|e| e.visible) {
                    self.push_event(lines, indent, event, disclosure);
                }
            }
        }
    }

    fn push_event(&self, lines: &mut Vec<String>, indent: &str, event: &EventView, disclosure: &Disclosure) {
        lines.push(format!(
            "{indent}{:>TIME_WIDTH$}  {}{}",
            event.time,
            self.title(event),
            marker(event)
        ));

        if self.options.expand_all || disclosure.is_open(&event.id) {
            let detail = format!("{indent}{}", " ".repeat(TIME_WIDTH + 2));
            lines.push(format!("{detail}{}", event.location));
            if !event.plain_text.is_empty() {
                lines.push(format!("{detail}{}", event.plain_text));
            }
        }
    }

    /// Renders search results grouped per feed.
    pub fn format_search(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("No events found for \"{}\".", results.query);
        }

        let mut lines = vec![format!(
            "Search results for \"{}\" ({})",
            results.query,
            results.len()
        )];
        for group in &results.groups {
            lines.push(String::new());
            lines.push(group.title.clone());
            for event in &group.events {
                lines.push(format!(
                    "{LIST_INDENT}{}  {:>TIME_WIDTH$}  {}",
                    event.date,
                    event.time,
                    self.title(event)
                ));
            }
        }
        lines.join("\n")
    }

    fn title<'a>(&self, event: &'a EventView) -> Cow<'a, str> {
        let title = match self.options.max_title_length {
            Some(max) => ellipsis(&event.title, max),
            None => Cow::Borrowed(event.title.as_str()),
        };
        if self.options.hyperlinks && !event.link.is_empty() {
            Cow::Owned(make_hyperlink(&event.link, &title))
        } else {
            title
        }
    }
}

/// Returns the proximity marker of an event. In progress wins over soon.
fn marker(event: &EventView) -> &'static str {
    if event.flags.is_in_progress {
        " [in progress]"
    } else if event.flags.is_soon {
        " [soon]"
    } else {
        ""
    }
}

/// Serializes any view model as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{truncated}..."))
}

/// Creates an OSC8 hyperlink for terminal output.
pub fn make_hyperlink(url: &str, label: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{label}\x1b]8;;\x1b\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsis_counts_chars() {
        assert_eq!(ellipsis("Career Fair", 20), "Career Fair");
        assert_eq!(ellipsis("Career Fair", 8), "Caree...");
        assert_eq!(ellipsis("Café Ünïcode", 7), "Café...");
        assert_eq!(ellipsis("x", 0), "");
    }

    #[test]
    fn hyperlink_wraps_label() {
        let link = make_hyperlink("https://www.example.edu/e?id=1", "Fair");
        assert!(link.starts_with("\x1b]8;;https://www.example.edu/e?id=1"));
        assert!(link.contains("\\Fair\x1b"));
    }

    #[test]
    fn output_format_serde() {
        assert_eq!(serde_json::to_string(&OutputFormat::Json).unwrap(), "\"json\"");
    }
}
