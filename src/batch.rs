//! Batch processing of every report in a directory.
//!
//! Reports are discovered by extension (the `[extensions] orca` setting,
//! `out` by default), read one at a time and turned into a
//! [`StructureDataset`]. A report that cannot be read is logged and skipped;
//! the remaining reports are still processed.

use crate::dataset::StructureDataset;
use crate::manifest::Manifest;
use crate::section::Document;
use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a batch before any report is processed.
#[derive(Error, Debug)]
pub enum BatchError {
    /// I/O error when listing the directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The path is not a directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

type Result<T> = std::result::Result<T, BatchError>;

/// Datasets built by a batch plus the reports that could not be read.
#[derive(Debug)]
pub struct BatchOutcome {
    /// One dataset per readable report, in file name order.
    pub datasets: Vec<StructureDataset>,
    /// Reports skipped because reading them failed.
    pub failures: Vec<(PathBuf, io::Error)>,
}

/// Lists regular, non-hidden files in `directory` with the given extension.
///
/// The extension is compared case-insensitively and may be given with or
/// without a leading dot. Results are sorted by file name.
pub fn discover_reports(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(BatchError::InvalidPath(format!(
            "Path is not a directory: {}",
            directory.display()
        )));
    }
    let wanted = extension.trim_start_matches('.');

    let mut reports = Vec::new();
    for entry in fs::read_dir(directory)? {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("");

                // Skip hidden files and directories
                if filename.starts_with('.') || path.is_dir() {
                    continue;
                }
                let matches = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .map_or(false, |ext| ext.eq_ignore_ascii_case(wanted));
                if matches {
                    reports.push(path);
                }
            }
            Err(e) => {
                warn!("Error reading directory entry: {}", e);
            }
        }
    }
    reports.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(reports)
}

/// Builds datasets for the given reports, skipping unreadable ones.
pub fn process_reports(reports: &[PathBuf], manifest: &Manifest) -> BatchOutcome {
    let mut datasets = Vec::with_capacity(reports.len());
    let mut failures = Vec::new();

    for path in reports {
        match Document::from_file(path) {
            Ok(document) => {
                info!("Processing {}", path.display());
                datasets.push(StructureDataset::build(&document, manifest));
            }
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                failures.push((path.clone(), e));
            }
        }
    }

    info!(
        "Batch completed: {} report(s) processed, {} skipped",
        datasets.len(),
        failures.len()
    );
    BatchOutcome { datasets, failures }
}

/// Discovers and processes every report in `directory`.
pub fn run_batch(directory: &Path, manifest: &Manifest, extension: &str) -> Result<BatchOutcome> {
    let reports = discover_reports(directory, extension)?;
    if reports.is_empty() {
        warn!(
            "No .{} files found in {}",
            extension.trim_start_matches('.'),
            directory.display()
        );
    }
    Ok(process_reports(&reports, manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_reports_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.out", "a.OUT", ".hidden.out", "notes.txt", "c.out"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("sub.out")).unwrap();

        let reports = discover_reports(dir.path(), ".out").unwrap();
        let names: Vec<&str> = reports
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.OUT", "b.out", "c.out"]);
    }

    #[test]
    fn test_discover_reports_rejects_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.out");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            discover_reports(&file, "out"),
            Err(BatchError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_unreadable_report_is_skipped() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.out");
        fs::write(&good, "no sections here").unwrap();
        let missing = dir.path().join("missing.out");

        let outcome = process_reports(&[missing.clone(), good], &Manifest::new("m.json"));
        assert_eq!(outcome.datasets.len(), 1);
        assert_eq!(outcome.datasets[0].document_name(), "good.out");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, missing);
    }
}
