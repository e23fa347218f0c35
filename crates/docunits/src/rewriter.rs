//! Content rewriter
//!
//! Brings the text of every document in line with the renamed tree: unit
//! tokens in prose and links, image-folder references, and the
//! `sidebar_position`, `id` and `slug` front-matter fields.

use crate::config::PairSource;
use crate::errors::RenumberError;
use crate::frontmatter::{self, Field};
use crate::planner::RenameMapping;
use crate::unit::UnitId;
use crate::walk::{self, ExcludeSet};
use regex::bytes::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Characters after a token that mark it as a folder-style name
const FOLDER_SEPARATORS: &[u8] = b"_-/\\";

/// Old and new tokens for every unit that shifts, highest minor first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPairs {
    major: u32,
    pairs: Vec<(UnitId, UnitId)>,
    by_minor: HashMap<u32, String>,
}

impl ReplacementPairs {
    pub fn new(major: u32, minors: impl IntoIterator<Item = u32>) -> Self {
        let minors: BTreeSet<u32> = minors.into_iter().filter(|m| *m < u32::MAX).collect();
        let pairs: Vec<(UnitId, UnitId)> = minors
            .into_iter()
            .rev()
            .map(|minor| {
                let old = UnitId::new(major, minor);
                (old, old.next())
            })
            .collect();
        let by_minor = pairs.iter().map(|(old, new)| (old.minor, new.token())).collect();
        Self { major, pairs, by_minor }
    }

    /// Pairs for exactly the units renamed on disk
    pub fn from_mapping(major: u32, mapping: &RenameMapping) -> Self {
        Self::new(major, mapping.units().into_iter().map(|u| u.minor))
    }

    /// Pairs for every token at or above `insert_minor` found in documents
    ///
    /// Unreadable documents are skipped here; the rewrite pass reports them.
    pub fn from_documents(
        root: &Path,
        excludes: &ExcludeSet,
        major: u32,
        insert_minor: u32,
    ) -> Result<Self, RenumberError> {
        let scanner = TokenScanner::new(major);
        let mut minors = BTreeSet::new();
        for doc in walk::documents(root, excludes)? {
            if let Ok(bytes) = fs::read(&doc) {
                minors.extend(scanner.minors(&bytes).filter(|m| *m >= insert_minor));
            }
        }
        Ok(Self::new(major, minors))
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn pairs(&self) -> &[(UnitId, UnitId)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn replacement(&self, minor: u32) -> Option<&str> {
        self.by_minor.get(&minor).map(String::as_str)
    }
}

/// Build the pair set from whichever source the run is configured for
pub fn replacement_pairs(
    source: PairSource,
    root: &Path,
    excludes: &ExcludeSet,
    major: u32,
    insert_minor: u32,
    mapping: &RenameMapping,
) -> Result<ReplacementPairs, RenumberError> {
    match source {
        PairSource::Mapping => Ok(ReplacementPairs::from_mapping(major, mapping)),
        PairSource::Content => {
            ReplacementPairs::from_documents(root, excludes, major, insert_minor)
        }
    }
}

/// A `major.minor` token found in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
    minor: u32,
}

/// Finds unit tokens that are not part of a larger number
///
/// The byte before a token must not be a digit and the minor is always the
/// full run of digits, so neither `18.2` nor `8.25` yields `8.2`. Minors with
/// leading zeros, or too large to be incremented, are skipped.
#[derive(Debug, Clone)]
struct TokenScanner {
    prefix_len: usize,
    pattern: Regex,
}

impl TokenScanner {
    fn new(major: u32) -> Self {
        let pattern =
            Regex::new(&format!(r"{}\.([0-9]+)", major)).expect("token pattern is valid");
        Self { prefix_len: major.to_string().len() + 1, pattern }
    }

    fn tokens<'t>(&'t self, text: &'t [u8]) -> impl Iterator<Item = Token> + 't {
        let mut pos = 0;
        std::iter::from_fn(move || loop {
            let m = self.pattern.find_at(text, pos)?;
            if m.start() > 0 && text[m.start() - 1].is_ascii_digit() {
                pos = m.start() + 1;
                continue;
            }
            pos = m.end();
            let digits = &text[m.start() + self.prefix_len..m.end()];
            if digits.len() > 1 && digits[0] == b'0' {
                continue;
            }
            let Some(minor) = std::str::from_utf8(digits)
                .ok()
                .and_then(|d| d.parse::<u32>().ok())
                .filter(|m| *m < u32::MAX)
            else {
                continue;
            };
            return Some(Token { start: m.start(), end: m.end(), minor });
        })
    }

    fn minors<'t>(&'t self, text: &'t [u8]) -> impl Iterator<Item = u32> + 't {
        self.tokens(text).map(|t| t.minor)
    }
}

/// Token substitution over a span of text, in a single left-to-right pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TokenCounts {
    references: usize,
    image_folders: usize,
}

fn substitute(
    text: &[u8],
    scanner: &TokenScanner,
    pairs: &ReplacementPairs,
    out: &mut Vec<u8>,
) -> TokenCounts {
    let mut counts = TokenCounts::default();
    let mut last = 0;
    for token in scanner.tokens(text) {
        let Some(new) = pairs.replacement(token.minor) else {
            continue;
        };
        out.extend_from_slice(&text[last..token.start]);
        out.extend_from_slice(new.as_bytes());
        last = token.end;
        match text.get(token.end) {
            Some(b) if FOLDER_SEPARATORS.contains(b) => counts.image_folders += 1,
            _ => counts.references += 1,
        }
    }
    out.extend_from_slice(&text[last..]);
    counts
}

/// How front-matter fields are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// `sidebar_position` values at or above this are candidates for a bump
    pub sidebar_threshold: u64,
    /// Whether candidates are actually incremented
    pub bump_sidebar_position: bool,
}

impl RewriteOptions {
    /// Defaults for an insertion at `insert_minor`: threshold one above it,
    /// sidebar positions kept unless bumping is asked for
    pub fn for_insert(insert_minor: u32) -> Self {
        Self { sidebar_threshold: u64::from(insert_minor) + 1, bump_sidebar_position: false }
    }
}

/// One front-matter field that changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: Field,
    pub old: String,
    pub new: String,
}

/// The result of rewriting one document's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: Vec<u8>,
    pub fields: Vec<FieldChange>,
    pub references: usize,
    pub image_folders: usize,
}

impl Rewrite {
    pub fn is_change_of(&self, original: &[u8]) -> bool {
        self.text != original
    }
}

fn field_value(
    line: &frontmatter::FieldLine<'_>,
    scanner: &TokenScanner,
    pairs: &ReplacementPairs,
    options: &RewriteOptions,
) -> Option<Vec<u8>> {
    match line.field {
        Field::SidebarPosition => {
            let value: u64 = std::str::from_utf8(line.value).ok()?.parse().ok()?;
            if options.bump_sidebar_position && value >= options.sidebar_threshold {
                Some(value.checked_add(1)?.to_string().into_bytes())
            } else {
                None
            }
        }
        Field::Id | Field::Slug => {
            let mut value = Vec::with_capacity(line.value.len() + 4);
            substitute(line.value, scanner, pairs, &mut value);
            (value != line.value).then_some(value)
        }
    }
}

/// Compute the rewritten bytes of a document
///
/// Everything is derived from the original text in one pass, so a token that
/// was just incremented is never looked at again. Tokens anywhere in a
/// recognized `id`/`slug` value are shifted and reported as field changes
/// rather than references.
pub fn rewrite_text(text: &[u8], pairs: &ReplacementPairs, options: &RewriteOptions) -> Rewrite {
    let scanner = TokenScanner::new(pairs.major());
    let mut out = Vec::with_capacity(text.len() + 16);
    let mut fields = Vec::new();
    let mut counts = TokenCounts::default();

    let body_start = match frontmatter::locate(text) {
        Some(block) => {
            out.extend_from_slice(&text[..block.start]);
            for line in text[block.clone()].split_inclusive(|b| *b == b'\n') {
                match frontmatter::parse_field_line(line) {
                    Some(field_line) => {
                        match field_value(&field_line, &scanner, pairs, options) {
                            Some(value) => {
                                fields.push(FieldChange {
                                    field: field_line.field,
                                    old: String::from_utf8_lossy(field_line.value).into_owned(),
                                    new: String::from_utf8_lossy(&value).into_owned(),
                                });
                                out.extend_from_slice(&field_line.with_value(&value));
                            }
                            None => out.extend_from_slice(line),
                        }
                    }
                    None => {
                        let c = substitute(line, &scanner, pairs, &mut out);
                        counts.references += c.references;
                        counts.image_folders += c.image_folders;
                    }
                }
            }
            if !out.ends_with(b"\n") {
                out.push(b'\n');
            }
            block.end
        }
        None => 0,
    };

    let c = substitute(&text[body_start..], &scanner, pairs, &mut out);
    counts.references += c.references;
    counts.image_folders += c.image_folders;

    Rewrite {
        text: out,
        fields,
        references: counts.references,
        image_folders: counts.image_folders,
    }
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub path: PathBuf,
    pub fields: Vec<FieldChange>,
    pub references: usize,
    pub image_folders: usize,
    /// The document is not valid UTF-8; undecodable bytes were kept as-is
    pub lossy: bool,
}

/// Outcome of a rewrite pass over a tree
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub scanned: usize,
    pub changed: Vec<DocumentChange>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Rewrite one document; `Ok(None)` when it needs no change
///
/// Unchanged documents are never opened for writing.
pub fn rewrite_document(
    path: &Path,
    pairs: &ReplacementPairs,
    options: &RewriteOptions,
    dry_run: bool,
) -> Result<Option<DocumentChange>, RenumberError> {
    let original = fs::read(path).map_err(|e| RenumberError::io(path, e))?;
    let rewrite = rewrite_text(&original, pairs, options);
    if !rewrite.is_change_of(&original) {
        return Ok(None);
    }

    if !dry_run {
        fs::write(path, &rewrite.text).map_err(|e| RenumberError::io(path, e))?;
    }

    Ok(Some(DocumentChange {
        path: path.to_path_buf(),
        fields: rewrite.fields,
        references: rewrite.references,
        image_folders: rewrite.image_folders,
        lossy: std::str::from_utf8(&original).is_err(),
    }))
}

/// Rewrite every document under `root`
///
/// A failure on one document is recorded and the pass moves on; only a
/// failure to walk the tree aborts.
pub fn rewrite_tree(
    root: &Path,
    excludes: &ExcludeSet,
    pairs: &ReplacementPairs,
    options: &RewriteOptions,
    dry_run: bool,
) -> Result<RewriteReport, RenumberError> {
    let mut report = RewriteReport::default();
    for doc in walk::documents(root, excludes)? {
        report.scanned += 1;
        match rewrite_document(&doc, pairs, options, dry_run) {
            Ok(Some(change)) => report.changed.push(change),
            Ok(None) => {}
            Err(e) => report.failures.push((doc, e.to_string())),
        }
    }
    Ok(report)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn larger_numbers_are_never_touched(lead in 1u32..100, minor in 0u32..50) {
            let text = format!("{}8.{} and 8.{}7", lead, minor, minor);
            let pairs = ReplacementPairs::new(8, [minor]);
            let out = rewrite_text(text.as_bytes(), &pairs, &RewriteOptions::for_insert(0));
            prop_assert_eq!(String::from_utf8(out.text).unwrap(), text);
        }

        #[test]
        fn every_shifted_token_gains_exactly_one(minor in 0u32..1000, insert in 0u32..1000) {
            let pairs = ReplacementPairs::new(8, (insert..1000).collect::<Vec<_>>());
            let text = format!("unit 8.{} here", minor);
            let out = rewrite_text(text.as_bytes(), &pairs, &RewriteOptions::for_insert(insert));
            let expected = if minor >= insert { minor + 1 } else { minor };
            prop_assert_eq!(
                String::from_utf8(out.text).unwrap(),
                format!("unit 8.{} here", expected)
            );
        }

        #[test]
        fn text_without_tokens_is_unchanged(s in "[a-z #\\-_/\n]*") {
            let pairs = ReplacementPairs::new(8, 0..20);
            let out = rewrite_text(s.as_bytes(), &pairs, &RewriteOptions::for_insert(0));
            prop_assert_eq!(out.text, s.into_bytes());
        }
    }
}
