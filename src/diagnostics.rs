//! Structured reports of values that could not be extracted.
//!
//! Extraction never fails outright. A missing section, an unknown atom label or
//! a derived value that lacks one of its atoms is stored as an absent value,
//! and a [`Diagnostic`] records why. Every diagnostic is also emitted as a
//! `warn!` log event when it is recorded.

use crate::category::Category;
use crate::keys::{AtomLabel, ExtractionKey};
use crate::record::RecordError;
use log::warn;
use std::fmt;

/// Why a value is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The section markers were not found in the document.
    SectionNotFound,
    /// The section exists but no row carries the requested label.
    RecordNotFound,
    /// A row was found but could not be read.
    MalformedRecord(String),
    /// A derived value needs an atom whose coordinate or charge is absent.
    MissingDependency {
        /// The first member that could not be resolved.
        atom: AtomLabel,
    },
    /// An angle was requested for coincident atoms.
    DegenerateGeometry,
    /// The key shape does not fit the category (e.g. a bond in a charge list).
    UnsupportedKey,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reason::SectionNotFound => f.write_str("section not found"),
            Reason::RecordNotFound => f.write_str("record not found"),
            Reason::MalformedRecord(detail) => write!(f, "malformed record ({})", detail),
            Reason::MissingDependency { atom } => write!(f, "missing data for atom {}", atom),
            Reason::DegenerateGeometry => f.write_str("coincident atoms"),
            Reason::UnsupportedKey => f.write_str("key does not apply to this category"),
        }
    }
}

impl From<RecordError> for Reason {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound => Reason::RecordNotFound,
            RecordError::Malformed(detail) => Reason::MalformedRecord(detail),
        }
    }
}

/// One absent value: which document, category and key, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Document name.
    pub document: String,
    /// Category being built.
    pub category: Category,
    /// Requested key.
    pub key: ExtractionKey,
    /// Cause.
    pub reason: Reason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.document, self.category, self.key, self.reason
        )
    }
}

/// Collects the diagnostics of one document.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    document: String,
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    /// Empty log for `document`.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            entries: Vec::new(),
        }
    }

    /// Records and logs one absent value.
    pub fn record(&mut self, category: Category, key: &ExtractionKey, reason: Reason) {
        let diagnostic = Diagnostic {
            document: self.document.clone(),
            category,
            key: key.clone(),
            reason,
        };
        warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Diagnostics in the order they were recorded.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Consumes the log.
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
