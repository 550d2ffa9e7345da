#![deny(missing_docs)]

//! odx - ORCA Output Data Extraction
//!
//! odx pulls structural and electronic properties out of ORCA quantum
//! chemistry output files and collects them into per-document datasets that
//! can be written as CSV, JSON or an Excel workbook.
//!
//! # Overview
//!
//! An ORCA output file is a long text report made of banner-delimited
//! sections, many of which repeat once per optimisation step. Extraction
//! happens in three layers:
//!
//! 1. **Section localisation**: isolate the text between a start and an end
//!    marker, either the first occurrence or the last one
//!    ([`section`](section/index.html)).
//! 2. **Record lookup**: find the row of one atom inside a section, matching
//!    labels like `"1 C"` only at token boundaries so `"1 C"` never matches
//!    `"11 C"` ([`record`](record/index.html)).
//! 3. **Derivation**: convert Bohr coordinates to Angstrom and compute
//!    distances, angles and charge sums, rounded to five decimals
//!    ([`geometry`](geometry/index.html)).
//!
//! Which atoms, bonds, angles and atom groups to extract is described by a
//! [`Manifest`](manifest::Manifest). Polarizability, dipole moment and
//! frontier orbital energies are fixed records extracted from every document.
//!
//! # Data Categories
//!
//! | Category | Source section | Occurrence | Keys |
//! |----------|----------------|------------|------|
//! | Initial Geometry | CARTESIAN COORDINATES (A.U.) | first | atom labels |
//! | Final Geometry | CARTESIAN COORDINATES (A.U.) | last | atom labels |
//! | Bond Lengths | CARTESIAN COORDINATES (A.U.) | last | atom pairs |
//! | Bond Angles | CARTESIAN COORDINATES (A.U.) | last | atom triples |
//! | Polarizability | THE POLARIZABILITY TENSOR | first | fixed |
//! | Dipole Moments | DIPOLE MOMENT | first | fixed |
//! | HOMO LUMO Energies | ORBITAL ENERGIES | last | fixed |
//! | Mulliken / Loewdin Charges | ... ATOMIC CHARGES | last | atom labels |
//! | Mulliken / Loewdin Charge Sums | ... ATOMIC CHARGES | last | atom groups |
//!
//! Values that cannot be extracted are kept as absent entries and reported
//! as [`Diagnostic`](diagnostics::Diagnostic)s; one missing atom never aborts
//! the rest of a document.
//!
//! # Quick Start
//!
//! ```no_run
//! use odx::batch::run_batch;
//! use odx::export::{export, ExportFormat};
//! use odx::manifest::Manifest;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manifest = Manifest::load(Path::new("pph3_inputs.json"))?;
//!     let outcome = run_batch(Path::new("."), &manifest, "out")?;
//!     export(&outcome.datasets, Path::new("ORCA_data_pph3_inputs"), ExportFormat::Csv)?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`section`](section/index.html) - Report documents and section localisation
//! - [`record`](record/index.html) - Row lookup inside a section
//! - [`geometry`](geometry/index.html) - Unit conversion, distances and angles
//! - [`keys`](keys/index.html) - Extraction keys and the composite key resolver forms
//! - [`category`](category/index.html) - Data categories
//! - [`extractors`](extractors/index.html) - One extractor per category
//! - [`dataset`](dataset/index.html) - Per-document datasets and lookups
//! - [`diagnostics`](diagnostics/index.html) - Reports of values that could not be extracted
//! - [`manifest`](manifest/index.html) - JSON and text manifests
//! - [`export`](export/index.html) - CSV, JSON and Excel output
//! - [`batch`](batch/index.html) - Directory processing
//! - [`settings`](settings/index.html) - Configuration file handling
//! - [`template_generator`](template_generator/index.html) - Manifest templates
//! - [`help`](help/index.html) - Built-in help system

/// Directory processing
pub mod batch;
pub mod category;
pub mod dataset;
pub mod diagnostics;
pub mod export;
pub mod extractors;
pub mod geometry;
/// Built-in help system
pub mod help;
pub mod keys;
pub mod manifest;
/// Dynamic file naming based on the manifest basename
pub mod naming;
pub mod record;
pub mod section;
/// Configuration management system
pub mod settings;
/// Manifest templates generated from ORCA output files
pub mod template_generator;

pub use dataset::{Datum, StructureDataset};
pub use manifest::Manifest;
pub use section::Document;
