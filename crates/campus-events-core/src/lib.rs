//! Core types: events, time classification, sanitizing, buckets, views, output

pub mod bucket;
pub mod disclosure;
pub mod error;
pub mod event;
pub mod filter;
pub mod format;
pub mod links;
pub mod sanitize;
pub mod time;
pub mod tracing;
pub mod view;

pub use bucket::{Bucket, BucketSet, Bucketizer, DayGroup, DEFAULT_WINDOW_DAYS};
pub use disclosure::Disclosure;
pub use error::{LinkRewriteError, ParseError};
pub use event::{Event, FeedId};
pub use filter::{
    apply_filter, search, EventMatcher, FeedEvents, SearchGroup, SearchResults,
    DEFAULT_MIN_QUERY_LEN,
};
pub use format::{ellipsis, make_hyperlink, to_json, OutputFormat, TextFormatter, TextOptions};
pub use links::{rewrite_link, LinkRewriter};
pub use sanitize::{extract_location, sanitize_description, strip_tags};
pub use time::{ProximityFlags, ProximityWindows, TimeFormat, DEFAULT_ZONE};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
pub use view::{
    project_event, project_section, DayGroupView, EventView, ListKind, ListView, PageView,
    SectionMeta, SectionView, ViewOptions, LOAD_FAILED_MESSAGE, NO_EVENTS_MESSAGE,
};
