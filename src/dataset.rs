//! Per-document extraction results.
//!
//! [`StructureDataset::build`] runs every category the manifest asks for
//! against one document, eagerly, and freezes the result. Categories whose key
//! list is empty are left out of the dataset entirely; the three record
//! categories (polarizability, dipole moment, frontier orbitals) take no keys
//! and are always present.
//!
//! Lookups go through the composite key resolver: a bond can be asked for in
//! either order, an angle in its given or fully reversed order, and an atom
//! group in any order. Lookups return copies.
//!
//! # Examples
//!
//! ```
//! use odx::category::Category;
//! use odx::dataset::{Datum, StructureDataset};
//! use odx::keys::ExtractionKey;
//! use odx::manifest::Manifest;
//! use odx::section::Document;
//!
//! let report = "CARTESIAN COORDINATES (A.U.)
//!    0 H    1.0000     0     1.008    0.000000    0.000000    0.000000
//!    1 H    1.0000     0     1.008    1.400000    0.000000    0.000000
//! INTERNAL COORDINATES (ANGSTROEM)";
//! let document = Document::new("h2.out", report);
//! let manifest = Manifest::new("h2.json")
//!     .with_keys(Category::BondLengths, vec![ExtractionKey::bond("0 H", "1 H")]);
//!
//! let dataset = StructureDataset::build(&document, &manifest);
//! let length = dataset
//!     .datum(Category::BondLengths, &ExtractionKey::bond("1 H", "0 H"))
//!     .unwrap();
//! assert_eq!(length, Datum::Scalar(Some("0.74085".to_string())));
//! assert!(dataset.category(Category::FinalGeometry).is_err());
//! ```

use crate::category::Category;
use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::extractors::extractor_for;
use crate::geometry::Coordinate;
use crate::keys::ExtractionKey;
use crate::manifest::Manifest;
use crate::section::Document;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors returned by dataset lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The category was not built for this document.
    #[error("{document}: category '{category}' not found")]
    CategoryNotFound {
        /// Document name.
        document: String,
        /// Requested category.
        category: Category,
    },
    /// The category exists but holds no value under any form of the key.
    #[error("{document}: {category} has no entry for {key}")]
    KeyNotFound {
        /// Document name.
        document: String,
        /// Requested category.
        category: Category,
        /// Requested key, as supplied.
        key: String,
    },
}

type Result<T> = std::result::Result<T, LookupError>;

/// One extracted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    /// Atom position; components may be absent.
    Coordinate(Coordinate),
    /// Scalar string, absent when it could not be extracted.
    Scalar(Option<String>),
}

impl Datum {
    /// Returns `true` when nothing was extracted.
    pub fn is_absent(&self) -> bool {
        match self {
            Datum::Coordinate(c) => c.is_absent(),
            Datum::Scalar(s) => s.is_none(),
        }
    }

    /// The scalar value, if this is a present scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Datum::Scalar(s) => s.as_deref(),
            Datum::Coordinate(_) => None,
        }
    }

    /// The coordinate, if this is a coordinate.
    pub fn as_coordinate(&self) -> Option<&Coordinate> {
        match self {
            Datum::Coordinate(c) => Some(c),
            Datum::Scalar(_) => None,
        }
    }
}

/// Values of one category for one document, in request order.
#[derive(Debug, Clone)]
pub struct DataCategory {
    category: Category,
    document_name: String,
    inputs: Vec<ExtractionKey>,
    data: Vec<(ExtractionKey, Datum)>,
    index: HashMap<ExtractionKey, usize>,
}

impl DataCategory {
    /// Extracts every key of `inputs` from `document`.
    ///
    /// The key set is fixed from here on: keys without a value map to an
    /// absent [`Datum`] and a diagnostic is appended to `log`. A key equivalent
    /// to an earlier one (the same bond twice, or a bond and its reversal) is
    /// kept once, at its first position.
    pub fn extract(
        category: Category,
        document: &Document,
        inputs: Vec<ExtractionKey>,
        log: &mut DiagnosticLog,
    ) -> Self {
        let inputs = distinct_keys(category, inputs);
        let data = extractor_for(category).extract(document, &inputs, log);
        let index = data
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();
        Self {
            category,
            document_name: document.name().to_string(),
            inputs,
            data,
            index,
        }
    }

    /// Which category this is.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Display name of the section.
    pub fn section_name(&self) -> &'static str {
        self.category.name()
    }

    /// Name of the document the values came from.
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Keys the category was built from.
    pub fn inputs(&self) -> &[ExtractionKey] {
        &self.inputs
    }

    /// Copy of every `(key, value)` pair, in request order.
    pub fn data(&self) -> Vec<(ExtractionKey, Datum)> {
        self.data.clone()
    }

    /// Borrowing iterator over the stored pairs.
    pub fn iter(&self) -> impl Iterator<Item = &(ExtractionKey, Datum)> {
        self.data.iter()
    }

    /// Resolves `key` and returns a copy of its value.
    ///
    /// The key is tried as supplied and then in its equivalent forms (see
    /// [`ExtractionKey::lookup_forms`]). A miss is logged and returned as
    /// [`LookupError::KeyNotFound`].
    pub fn datum(&self, key: &ExtractionKey) -> Result<Datum> {
        self.resolve(key).cloned().ok_or_else(|| {
            warn!(
                "{}: no {} entry for {}",
                self.document_name, self.category, key
            );
            LookupError::KeyNotFound {
                document: self.document_name.clone(),
                category: self.category,
                key: key.to_string(),
            }
        })
    }

    fn resolve(&self, key: &ExtractionKey) -> Option<&Datum> {
        key.lookup_forms()
            .iter()
            .find_map(|form| self.index.get(form))
            .map(|&i| &self.data[i].1)
    }
}

fn distinct_keys(category: Category, inputs: Vec<ExtractionKey>) -> Vec<ExtractionKey> {
    let mut seen = HashSet::new();
    inputs
        .into_iter()
        .filter(|key| {
            if key.lookup_forms().iter().any(|form| seen.contains(form)) {
                debug!("Dropping repeated {} key {}", category, key);
                return false;
            }
            seen.insert(key.clone());
            true
        })
        .collect()
}

/// Everything extracted from one document.
#[derive(Debug, Clone)]
pub struct StructureDataset {
    document_name: String,
    manifest_name: String,
    categories: Vec<DataCategory>,
    diagnostics: Vec<Diagnostic>,
}

impl StructureDataset {
    /// Builds every category `manifest` requests from `document`.
    pub fn build(document: &Document, manifest: &Manifest) -> Self {
        let mut log = DiagnosticLog::new(document.name());
        let mut categories = Vec::new();

        for category in Category::ALL {
            let inputs: Vec<ExtractionKey> = if category.takes_inputs() {
                manifest.keys(category).to_vec()
            } else {
                category
                    .fixed_fields()
                    .iter()
                    .map(|field| ExtractionKey::field(field))
                    .collect()
            };
            if inputs.is_empty() {
                continue;
            }
            categories.push(DataCategory::extract(category, document, inputs, &mut log));
        }

        let diagnostics = log.into_entries();
        info!(
            "Extracted {} categories from {} ({} values missing)",
            categories.len(),
            document.name(),
            diagnostics.len()
        );

        Self {
            document_name: document.name().to_string(),
            manifest_name: manifest.name().to_string(),
            categories,
            diagnostics,
        }
    }

    /// Name of the source document.
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Name of the manifest the dataset was built from.
    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    /// Categories present, in dataset order.
    pub fn categories(&self) -> &[DataCategory] {
        &self.categories
    }

    /// The built category, or [`LookupError::CategoryNotFound`].
    pub fn category(&self, category: Category) -> Result<&DataCategory> {
        self.categories
            .iter()
            .find(|c| c.category() == category)
            .ok_or_else(|| {
                warn!("{}: category {} not found", self.document_name, category);
                LookupError::CategoryNotFound {
                    document: self.document_name.clone(),
                    category,
                }
            })
    }

    /// Copy of one category's `(key, value)` pairs.
    pub fn category_data(&self, category: Category) -> Result<Vec<(ExtractionKey, Datum)>> {
        Ok(self.category(category)?.data())
    }

    /// Copy of one value, resolved through the composite key rules.
    pub fn datum(&self, category: Category, key: &ExtractionKey) -> Result<Datum> {
        self.category(category)?.datum(key)
    }

    /// Every absent value recorded while building, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "
CARTESIAN COORDINATES (A.U.)
   0 O    8.0000     0    15.999    0.000000    0.000000    0.000000
   1 H    1.0000     0     1.008    1.889726    0.000000    0.000000
   2 H    1.0000     0     1.008    0.000000    1.889726    0.000000
INTERNAL COORDINATES (ANGSTROEM)
";

    fn dataset(manifest: Manifest) -> StructureDataset {
        StructureDataset::build(&Document::new("water.out", REPORT), &manifest)
    }

    #[test]
    fn test_empty_categories_are_omitted() {
        let data = dataset(
            Manifest::new("m.json")
                .with_keys(Category::InitialGeometry, vec![ExtractionKey::atom("0 O")]),
        );
        let names: Vec<&str> = data.categories().iter().map(|c| c.section_name()).collect();
        assert_eq!(
            names,
            vec!["Initial Geometry", "Polarizability", "Dipole Moments", "HOMO LUMO Energies"]
        );
        assert!(matches!(
            data.category(Category::BondLengths),
            Err(LookupError::CategoryNotFound { .. })
        ));
    }

    #[test]
    fn test_record_categories_present_but_absent() {
        let data = dataset(Manifest::new("m.json"));
        let dipole = data.category(Category::DipoleMoments).unwrap();
        assert_eq!(dipole.inputs().len(), 4);
        assert!(dipole.iter().all(|(_, d)| d.is_absent()));
        assert_eq!(data.diagnostics().len(), 16);
    }

    #[test]
    fn test_bond_lookup_any_order() {
        let data = dataset(
            Manifest::new("m.json")
                .with_keys(Category::BondLengths, vec![ExtractionKey::bond("0 O", "1 H")]),
        );
        let forward = data.datum(Category::BondLengths, &ExtractionKey::bond("0 O", "1 H"));
        let backward = data.datum(Category::BondLengths, &ExtractionKey::bond("1 H", "0 O"));
        assert_eq!(forward, backward);
        assert_eq!(forward.unwrap().as_scalar(), Some("1.00000"));
    }

    #[test]
    fn test_angle_lookup_only_full_reversal() {
        let data = dataset(Manifest::new("m.json").with_keys(
            Category::BondAngles,
            vec![ExtractionKey::angle("1 H", "0 O", "2 H")],
        ));
        let reversed = data.datum(Category::BondAngles, &ExtractionKey::angle("2 H", "0 O", "1 H"));
        assert_eq!(reversed.unwrap().as_scalar(), Some("90.00000"));
        assert!(matches!(
            data.datum(Category::BondAngles, &ExtractionKey::angle("0 O", "1 H", "2 H")),
            Err(LookupError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_data_is_a_copy() {
        let data = dataset(
            Manifest::new("m.json")
                .with_keys(Category::FinalGeometry, vec![ExtractionKey::atom("1 H")]),
        );
        let mut copy = data.category_data(Category::FinalGeometry).unwrap();
        copy.clear();
        assert_eq!(data.category_data(Category::FinalGeometry).unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_keys_are_stored_once() {
        let data = dataset(Manifest::new("m.json").with_keys(
            Category::BondLengths,
            vec![
                ExtractionKey::bond("0 O", "1 H"),
                ExtractionKey::bond("0 O", "2 H"),
                ExtractionKey::bond("0 O", "1 H"),
                ExtractionKey::bond("1 H", "0 O"),
            ],
        ));
        let bonds = data.category(Category::BondLengths).unwrap();
        assert_eq!(
            bonds.inputs(),
            &[ExtractionKey::bond("0 O", "1 H"), ExtractionKey::bond("0 O", "2 H")]
        );
        let entries = bonds.data();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, ExtractionKey::bond("0 O", "1 H"));
        assert_eq!(entries[0].1.as_scalar(), Some("1.00000"));
    }

    #[test]
    fn test_repeated_manifest_bond_in_either_order() {
        let manifest = Manifest::from_json(
            "m.json",
            r#"{"bond_length_data_labels": [["1 H", "0 O"], ["0 O", "1 H"]]}"#,
        )
        .unwrap();
        let data = dataset(manifest);
        let bonds = data.category(Category::BondLengths).unwrap();
        assert_eq!(bonds.inputs().len(), 1);
        assert_eq!(bonds.data().len(), 1);
    }
}
