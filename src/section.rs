//! Report documents and section localisation.
//!
//! ORCA writes the same block header many times in one output file: every
//! optimisation cycle prints a fresh `CARTESIAN COORDINATES (A.U.)` table and a
//! fresh set of population analyses. Callers therefore pick which occurrence
//! is authoritative through [`Occurrence`]:
//!
//! - [`Occurrence::First`] is a plain forward substring search.
//! - [`Occurrence::Last`] searches a copy of the document whose *line order* is
//!   reversed. The copy is built once when the [`Document`] is loaded, so every
//!   later search is a single linear scan. In the reversed text the end marker
//!   of the final block is met before its start marker, and the block body is
//!   flipped back into reading order before it is returned.
//!
//! # Examples
//!
//! ```
//! use odx::section::{Document, Occurrence, SectionMarkers};
//!
//! let text = "BEGIN\n1\nEND\nBEGIN\n2\nEND\n";
//! let doc = Document::new("run.out", text);
//! let markers = SectionMarkers::new("BEGIN", "END");
//!
//! assert_eq!(doc.locate(&markers, Occurrence::First).unwrap().trim(), "1");
//! assert_eq!(doc.locate(&markers, Occurrence::Last).unwrap().trim(), "2");
//! ```

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

/// Which occurrence of a repeated section wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// The earliest block in the document (e.g. the input geometry).
    First,
    /// The latest block in the document (e.g. the converged geometry).
    Last,
}

/// Start and end marker strings delimiting one kind of block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMarkers {
    /// Text that opens the block.
    pub start: &'static str,
    /// Text that closes the block. The first match after `start` is used.
    pub end: &'static str,
}

impl SectionMarkers {
    /// Creates a marker pair.
    pub const fn new(start: &'static str, end: &'static str) -> Self {
        Self { start, end }
    }
}

/// Immutable text of one report together with its line-reversed twin.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    text: String,
    reversed: String,
}

impl Document {
    /// Wraps already-loaded report text.
    ///
    /// `name` identifies the document in diagnostics and exports; it is
    /// normally the report's file name.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let reversed = reverse_lines(&text);
        Self {
            name: name.into(),
            text,
            reversed,
        }
    }

    /// Reads a report from disk, naming it after the file name.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, text))
    }

    /// Name used to identify this document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full report text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Isolates one block delimited by `markers`.
    ///
    /// Returns `None` when either marker is missing. The text between the
    /// markers is borrowed for [`Occurrence::First`]; for
    /// [`Occurrence::Last`] it is rebuilt from the reversed copy, so the line
    /// containing the start marker comes first and the one containing the end
    /// marker comes last either way.
    pub fn locate(
        &self,
        markers: &SectionMarkers,
        occurrence: Occurrence,
    ) -> Option<Cow<'_, str>> {
        match occurrence {
            Occurrence::First => {
                locate_first(&self.text, markers.start, markers.end).map(Cow::Borrowed)
            }
            Occurrence::Last => locate_first(&self.reversed, markers.end, markers.start)
                .map(|block| Cow::Owned(reverse_lines(block))),
        }
    }
}

/// Returns the text between the first `start` and the first `end` after it.
pub fn locate_first<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let body_start = text.find(start)? + start.len();
    let body_len = text[body_start..].find(end)?;
    Some(&text[body_start..body_start + body_len])
}

fn reverse_lines(text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.reverse();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKERS: SectionMarkers = SectionMarkers::new("START", "STOP");

    #[test]
    fn test_first_occurrence_is_borrowed() {
        let doc = Document::new("a.out", "head\nSTART\nalpha\nSTOP\nSTART\nbeta\nSTOP\n");
        let block = doc.locate(&MARKERS, Occurrence::First).unwrap();
        assert!(matches!(block, Cow::Borrowed(_)));
        assert_eq!(block.trim(), "alpha");
    }

    #[test]
    fn test_last_occurrence_keeps_line_order() {
        let doc = Document::new(
            "a.out",
            "START\nold\nSTOP\nSTART\nrow 1\nrow 2\nrow 3\nSTOP\ntrailer\n",
        );
        let block = doc.locate(&MARKERS, Occurrence::Last).unwrap();
        let rows: Vec<&str> = block.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(rows, vec!["row 1", "row 2", "row 3"]);
    }

    #[test]
    fn test_single_block_is_both_first_and_last() {
        let doc = Document::new("a.out", "START\nonly\nSTOP");
        let first = doc.locate(&MARKERS, Occurrence::First).unwrap();
        let last = doc.locate(&MARKERS, Occurrence::Last).unwrap();
        assert_eq!(first.trim(), last.trim());
    }

    #[test]
    fn test_missing_markers() {
        let doc = Document::new("a.out", "START\nno end here\n");
        assert!(doc.locate(&MARKERS, Occurrence::First).is_none());
        assert!(doc.locate(&MARKERS, Occurrence::Last).is_none());

        let doc = Document::new("a.out", "no start\nSTOP\n");
        assert!(doc.locate(&MARKERS, Occurrence::First).is_none());
        assert!(doc.locate(&MARKERS, Occurrence::Last).is_none());
    }

    #[test]
    fn test_end_marker_must_follow_start() {
        assert_eq!(locate_first("STOP x START y STOP", "START", "STOP"), Some(" y "));
    }
}
