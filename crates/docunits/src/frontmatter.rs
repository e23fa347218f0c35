//! Line-oriented front-matter handling
//!
//! Only a flat block of `key: value` lines delimited by `---` at the very
//! start of a document is recognized. Documents are handled as raw bytes so
//! anything that is not valid UTF-8 passes through untouched.

use regex::bytes::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

const MARKER: &[u8] = b"---";

/// Front-matter keys that take part in renumbering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SidebarPosition,
    Id,
    Slug,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SidebarPosition => "sidebar_position",
            Field::Id => "id",
            Field::Slug => "slug",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized field line split into the value and everything around it
///
/// `head + value + tail` reproduces the original line exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine<'a> {
    pub field: Field,
    /// Key, colon, spacing and an opening quote if any
    pub head: &'a [u8],
    pub value: &'a [u8],
    /// Closing quote, trailing whitespace and the line terminator
    pub tail: &'a [u8],
}

impl FieldLine<'_> {
    /// The line with a new value in place of the old one
    pub fn with_value(&self, value: &[u8]) -> Vec<u8> {
        let mut line = Vec::with_capacity(self.head.len() + value.len() + self.tail.len());
        line.extend_from_slice(self.head);
        line.extend_from_slice(value);
        line.extend_from_slice(self.tail);
        line
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(sidebar_position|id|slug)[ \t]*:[ \t]*").expect("key pattern is valid")
    })
}

fn is_marker(line: &[u8]) -> bool {
    trim_end(line) == MARKER
}

fn trim_end(line: &[u8]) -> &[u8] {
    let end = line.iter().rposition(|b| !b" \t\r\n".contains(b)).map_or(0, |i| i + 1);
    &line[..end]
}

/// Byte range of the lines strictly between the opening and closing markers
///
/// The opening marker must be the first line of the document. Returns
/// `None` when the document has no complete front-matter block.
pub fn locate(doc: &[u8]) -> Option<Range<usize>> {
    let mut lines = doc.split_inclusive(|b| *b == b'\n');
    let first = lines.next()?;
    if !first.ends_with(b"\n") || !is_marker(first) {
        return None;
    }

    let start = first.len();
    let mut pos = start;
    for line in lines {
        if is_marker(line) {
            return Some(start..pos);
        }
        pos += line.len();
    }
    None
}

/// Parse one front-matter line; `None` for anything but the three keys
///
/// Indented lines belong to nested structures and are never recognized.
/// `sidebar_position` needs a plain non-negative integer; `id` and `slug`
/// need a non-empty value, optionally wrapped in single or double quotes.
pub fn parse_field_line(line: &[u8]) -> Option<FieldLine<'_>> {
    let caps = key_pattern().captures(line)?;
    let field = match caps.get(1)?.as_bytes() {
        b"sidebar_position" => Field::SidebarPosition,
        b"id" => Field::Id,
        _ => Field::Slug,
    };

    let head_end = caps.get(0)?.end();
    let content_end = trim_end(line).len().max(head_end);
    let (mut value_start, mut value_end) = (head_end, content_end);

    if field != Field::SidebarPosition {
        if let Some(&quote) = line.get(value_start).filter(|b| **b == b'"' || **b == b'\'') {
            value_start += 1;
            if value_end > value_start && line[value_end - 1] == quote {
                value_end -= 1;
            }
        }
    }

    let value = &line[value_start..value_end];
    let valid = match field {
        Field::SidebarPosition => !value.is_empty() && value.iter().all(u8::is_ascii_digit),
        Field::Id | Field::Slug => !value.is_empty(),
    };
    if !valid {
        return None;
    }

    Some(FieldLine { field, head: &line[..value_start], value, tail: &line[value_end..] })
}
