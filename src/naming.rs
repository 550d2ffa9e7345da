//! Output file naming based on the manifest basename
//!
//! When no output name is given on the command line, results are written next
//! to the working directory as `{prefix}_{manifest stem}.{csv|json|xlsx}`, so runs
//! with different manifests in one directory do not overwrite each other.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use odx::export::ExportFormat;
//! use odx::naming::OutputNaming;
//!
//! let naming = OutputNaming::new(Path::new("inputs/pph3_inputs.json"), "ORCA_data");
//!
//! assert_eq!(naming.basename(), "pph3_inputs");
//! assert_eq!(naming.output_name(), "ORCA_data_pph3_inputs");
//! assert_eq!(naming.output_file(ExportFormat::Json), "ORCA_data_pph3_inputs.json");
//! ```

use crate::export::ExportFormat;
use std::path::Path;

/// Manages output naming based on the manifest basename
#[derive(Debug, Clone)]
pub struct OutputNaming {
    basename: String,
    prefix: String,
}

impl OutputNaming {
    /// Creates an OutputNaming instance from a manifest path and a prefix
    ///
    /// Extracts the file stem (filename without extension) to use as the
    /// basename of generated file names.
    pub fn new(manifest_path: &Path, prefix: &str) -> Self {
        let basename = manifest_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("odx_job")
            .to_string();

        Self {
            basename,
            prefix: prefix.to_string(),
        }
    }

    /// Returns the manifest basename
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Returns the default output name without extension
    ///
    /// Format: `{prefix}_{basename}`, or just `{basename}` for an empty prefix
    pub fn output_name(&self) -> String {
        if self.prefix.is_empty() {
            self.basename.clone()
        } else {
            format!("{}_{}", self.prefix, self.basename)
        }
    }

    /// Returns the default output file name for `format`
    ///
    /// Format: `{prefix}_{basename}.{csv|json|xlsx}`
    pub fn output_file(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.output_name(), format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name() {
        let naming = OutputNaming::new(Path::new("pph3_inputs.json"), "ORCA_data");
        assert_eq!(naming.output_name(), "ORCA_data_pph3_inputs");
    }

    #[test]
    fn test_output_file_with_different_extensions() {
        let naming1 = OutputNaming::new(Path::new("test.json"), "ORCA_data");
        assert_eq!(naming1.output_file(ExportFormat::Csv), "ORCA_data_test.csv");

        let naming2 = OutputNaming::new(Path::new("legacy_inputs.txt"), "ORCA_data");
        assert_eq!(naming2.output_file(ExportFormat::Json), "ORCA_data_legacy_inputs.json");
    }

    #[test]
    fn test_empty_prefix() {
        let naming = OutputNaming::new(Path::new("/path/to/run.json"), "");
        assert_eq!(naming.output_name(), "run");
    }

    #[test]
    fn test_basename_extraction() {
        let naming = OutputNaming::new(Path::new("/path/to/compound_123.json"), "x");
        assert_eq!(naming.basename(), "compound_123");
    }
}
