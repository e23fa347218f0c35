//! Unit identifiers and unit-prefixed names
//!
//! A unit is identified by a dotted `major.minor` pair. Names of files and
//! folders in a docs tree start with the canonical rendering of a unit
//! (`8.3-intro.md`, `8.5-Images`, `8.5.1`), followed by a free-form suffix.

use regex::Regex;
use serde::Serialize;
use std::fmt;

/// A `major.minor` unit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnitId {
    pub major: u32,
    pub minor: u32,
}

impl UnitId {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The unit one minor step later
    pub fn next(self) -> Self {
        Self { major: self.major, minor: self.minor + 1 }
    }

    /// Canonical token, e.g. `8.3`
    pub fn token(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A base name split into its unit prefix and the untouched remainder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitName<'a> {
    pub unit: UnitId,
    pub suffix: &'a str,
}

impl UnitName<'_> {
    /// The same name with the unit advanced by one minor step
    pub fn bumped(&self) -> String {
        format!("{}{}", self.unit.next(), self.suffix)
    }
}

/// Matches base names that start with a unit of one fixed major
///
/// The minor must be canonical (no leading zeros) and a maximal digit run:
/// the suffix is either empty or starts with `.`, `-` or a non-digit word
/// character. A minor of `u32::MAX` has no successor and never matches.
#[derive(Debug, Clone)]
pub struct UnitMatcher {
    major: u32,
    pattern: Regex,
}

impl UnitMatcher {
    pub fn new(major: u32) -> Self {
        let source = format!(r"(?s)^{}\.(0|[1-9][0-9]*)((?:[.\-]|[\w&&[^0-9]]).*)?$", major);
        let pattern = Regex::new(&source).expect("unit pattern is valid for any major");
        Self { major, pattern }
    }

    /// Parse a base name, returning the unit and the preserved suffix
    pub fn parse<'a>(&self, name: &'a str) -> Option<UnitName<'a>> {
        let caps = self.pattern.captures(name)?;
        let minor = caps.get(1)?.as_str().parse::<u32>().ok().filter(|m| *m < u32::MAX)?;
        let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        Some(UnitName { unit: UnitId::new(self.major, minor), suffix })
    }
}
