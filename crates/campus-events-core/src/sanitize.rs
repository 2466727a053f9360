//! Description cleanup for feed items.
//!
//! Calendar publishers emit descriptions with stacked `<br>` tags, empty
//! paragraphs and line breaks directly after block tags. [`sanitize_description`]
//! normalizes that markup. The rules are applied until nothing changes, so the
//! transform is idempotent: `sanitize(sanitize(x)) == sanitize(x)`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Two or more consecutive line breaks.
static REPEATED_BR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:<br\s*/?>\s*){2,}").expect("Invalid repeated <br> regex")
});

/// Line breaks at the very end of the text.
static TRAILING_BR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:<br\s*/?>\s*)+$").expect("Invalid trailing <br> regex"));

/// A line break directly after a paragraph close or a block open/close tag.
static BR_AFTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(</p>|<p(?:\s[^>]*)?>|</div>|<div(?:\s[^>]*)?>)\s*<br\s*/?>")
        .expect("Invalid block <br> regex")
});

/// Paragraphs holding only whitespace or non-breaking spaces.
static EMPTY_P: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<p(?:\s[^>]*)?>(?:\s|&nbsp;|&#160;)*</p>").expect("Invalid empty <p> regex")
});

/// Divs holding only whitespace or non-breaking spaces.
static EMPTY_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<div(?:\s[^>]*)?>(?:\s|&nbsp;|&#160;)*</div>")
        .expect("Invalid empty <div> regex")
});

/// Leading text up to the first line break.
static FIRST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([^<]+)<br").expect("Invalid first line regex"));

/// A line starting with a weekday name and a comma is a date line.
static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday),")
        .expect("Invalid date line regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Normalizes the markup of an item description.
pub fn sanitize_description(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Applies every rule once. Each rule only ever shortens the text.
fn sanitize_pass(text: &str) -> String {
    let text = REPEATED_BR.replace_all(text, "<br>");
    let text = replace_all_owned(&TRAILING_BR, text, "");
    let text = replace_all_owned(&EMPTY_P, text, "");
    let text = replace_all_owned(&EMPTY_DIV, text, "");
    let text = replace_all_owned(&BR_AFTER_BLOCK, text, "$1");
    text.into_owned()
}

fn replace_all_owned<'a>(re: &Regex, text: Cow<'a, str>, rep: &str) -> Cow<'a, str> {
    match re.replace_all(&text, rep) {
        Cow::Borrowed(_) => text,
        Cow::Owned(replaced) => Cow::Owned(replaced),
    }
}

/// Extracts the location line from a sanitized description.
///
/// The location is the text before the first line break, unless that text is
/// a date line such as `Monday, October 20, 2025`.
pub fn extract_location(description: &str) -> Option<String> {
    let first_line = FIRST_LINE.captures(description)?.get(1)?.as_str().trim();
    if first_line.is_empty() || DATE_LINE.is_match(first_line) {
        return None;
    }
    Some(first_line.to_string())
}

/// Strips HTML tags and collapses whitespace, for text matching.
pub fn strip_tags(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
