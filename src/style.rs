//! Case styles, slugs and UUID preservation for rendered names.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Separator used between slug words.
pub const SLUG_SEPARATOR: char = '_';

/// RFC 4122 version 4 UUID: version nibble `4`, variant nibble in `8/9/a/b`.
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}",
    )
    .expect("valid uuid pattern")
});

/// Case normalization applied to rendered folder paths and file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Style {
    Lowercase,
    Uppercase,
    /// Leave case untouched. Written as `""` in tree documents.
    #[default]
    None,
}

impl Style {
    pub fn from_str(s: &str) -> Self {
        match s {
            "lowercase" => Style::Lowercase,
            "uppercase" => Style::Uppercase,
            _ => Style::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Lowercase => "lowercase",
            Style::Uppercase => "uppercase",
            Style::None => "",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Style::Lowercase => text.to_lowercase(),
            Style::Uppercase => text.to_uppercase(),
            Style::None => text.to_string(),
        }
    }
}

impl From<String> for Style {
    fn from(s: String) -> Self {
        Style::from_str(&s)
    }
}

impl From<Style> for String {
    fn from(style: Style) -> Self {
        style.as_str().to_string()
    }
}

/// Lowercase slug with runs of non-alphanumeric characters collapsed to `_`.
///
/// Apostrophes are dropped rather than turned into separators (`Bob's` -> `bobs`).
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SLUG_SEPARATOR);
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// UUID-shaped substrings of `text`, in order of appearance.
pub fn find_uuids(text: &str) -> Vec<&str> {
    UUID_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Slugify and style a whole file name while keeping embedded UUIDs exact.
pub fn slugify_preserving_uuids(text: &str, style: Style) -> String {
    let uuids = find_uuids(text);
    let mut result = style.apply(&slugify(text));
    for uuid in uuids {
        let mangled = style.apply(&slugify(uuid));
        result = result.replace(&mangled, uuid);
    }
    result
}

/// Style a rendered folder path (separators untouched) while keeping embedded UUIDs exact.
pub fn apply_style_preserving_uuids(text: &str, style: Style) -> String {
    let uuids = find_uuids(text);
    let mut result = style.apply(text);
    for uuid in uuids {
        result = result.replace(&style.apply(uuid), uuid);
    }
    result
}
