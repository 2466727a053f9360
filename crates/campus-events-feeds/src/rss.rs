//! RSS parsing.
//!
//! Turns the RSS 2.0 document served by the proxy into ordered [`Event`]s.
//! Only `title`, `pubDate`, `link` and `description` of each `<item>` are read.
//! Parsing is lenient: items with unusable dates are skipped and a malformed
//! document keeps every item completed before the error.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use quick_xml::events::Event as XmlEvent;
use tracing::{debug, trace, warn};

use campus_events_core::time::to_zone;
use campus_events_core::{
    DEFAULT_ZONE, Event, LinkRewriter, ParseError, extract_location, sanitize_description,
};

/// Offset-carrying formats tried after RFC 2822 and RFC 3339.
const LENIENT_OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Formats without an offset, read as wall-clock time in the display zone.
const LENIENT_NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Outcome of parsing one feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Parsed events, ascending by start; ties keep document order.
    pub events: Vec<Event>,
    /// Number of items dropped.
    pub skipped: usize,
    /// Non-fatal problems met while parsing.
    pub warnings: Vec<ParseError>,
}

/// Parses RSS documents for one feed.
#[derive(Debug, Clone)]
pub struct FeedParser {
    links: LinkRewriter,
    zone: Tz,
}

impl FeedParser {
    /// Creates a parser rewriting links onto `base_url`, in the default zone.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            links: LinkRewriter::new(base_url),
            zone: DEFAULT_ZONE,
        }
    }

    /// Sets the display zone events are converted into.
    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Parses a feed document. An empty document is an empty feed.
    pub fn parse(&self, xml: &str) -> ParseReport {
        let mut report = ParseReport::default();

        let mut reader = quick_xml::Reader::from_str(xml);

        let mut item: Option<RawItem> = None;
        let mut field: Option<Field> = None;
        // Elements nested inside the open field; their text belongs to it.
        let mut nested = 0usize;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(XmlEvent::Start(e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        _ if field.is_some() => nested += 1,
                        b"item" => {
                            item = Some(RawItem::default());
                            nested = 0;
                        }
                        other if item.is_some() => field = Field::from_name(other),
                        _ => {}
                    }
                }
                Ok(XmlEvent::End(e)) => {
                    let name = e.local_name();
                    if field.is_some() && nested > 0 {
                        nested -= 1;
                    } else if field.is_some_and(|f| f.name() == name.as_ref()) {
                        field = None;
                    } else if name.as_ref() == b"item" {
                        field = None;
                        if let Some(raw) = item.take() {
                            self.finish_item(raw, &mut report);
                        }
                    }
                }
                Ok(XmlEvent::Text(e)) => {
                    if let (Some(raw), Some(f)) = (item.as_mut(), field) {
                        let text = match e.unescape() {
                            Ok(text) => text.into_owned(),
                            // Undeclared entities such as &nbsp; are kept verbatim.
                            Err(_) => String::from_utf8_lossy(&e).into_owned(),
                        };
                        raw.push(f, &text);
                    }
                }
                Ok(XmlEvent::CData(e)) => {
                    if let (Some(raw), Some(f)) = (item.as_mut(), field) {
                        raw.push(f, &String::from_utf8_lossy(&e));
                    }
                }
                Ok(XmlEvent::Eof) => break,
                Err(e) => {
                    let position = reader.buffer_position();
                    warn!(position, error = %e, "Malformed feed XML, keeping items parsed so far");
                    if item.is_some() {
                        report.skipped += 1;
                    }
                    report.warnings.push(ParseError::xml(position, e.to_string()));
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        report.events.sort_by_key(|e| e.start);
        debug!(
            events = report.events.len(),
            skipped = report.skipped,
            warnings = report.warnings.len(),
            "Parsed feed"
        );
        report
    }

    fn finish_item(&self, raw: RawItem, report: &mut ParseReport) {
        let Some(start) = parse_pub_date(&raw.pub_date, self.zone) else {
            let err = ParseError::invalid_date(raw.title.trim(), &raw.pub_date);
            warn!(error = %err, "Skipping feed item");
            report.skipped += 1;
            report.warnings.push(err);
            return;
        };

        let title = raw.title.trim();
        let description = sanitize_description(raw.description.trim());
        let location = extract_location(&description);
        trace!(title, %start, "Parsed item");

        report.events.push(
            Event::new(title, start)
                .with_link(self.links.rewrite(raw.link.trim()))
                .with_description(description)
                .with_location(location),
        );
    }
}

/// Parses an RSS `pubDate` and converts it into `zone`.
///
/// Tries RFC 2822, RFC 3339, then a few lenient variants. Values without an
/// offset are read as wall-clock time in `zone`.
pub fn parse_pub_date(value: &str, zone: Tz) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .or_else(|| {
            LENIENT_OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        });
    if let Some(dt) = parsed {
        return Some(to_zone(&dt, zone));
    }

    LENIENT_NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| resolve_local(naive, zone))
        .map(|dt| to_zone(&dt, zone))
}

/// Maps a wall-clock time onto `zone`, taking the earlier instant of a
/// repeated hour and moving times inside a skipped hour forward by one hour.
fn resolve_local(naive: NaiveDateTime, zone: Tz) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    PubDate,
    Link,
    Description,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"pubDate" => Some(Self::PubDate),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            _ => None,
        }
    }

    fn name(&self) -> &'static [u8] {
        match self {
            Self::Title => b"title",
            Self::PubDate => b"pubDate",
            Self::Link => b"link",
            Self::Description => b"description",
        }
    }
}

/// Item fields as read from the document; missing fields stay empty.
#[derive(Debug, Default)]
struct RawItem {
    title: String,
    pub_date: String,
    link: String,
    description: String,
}

impl RawItem {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::PubDate => &mut self.pub_date,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
        };
        target.push_str(text);
    }
}
