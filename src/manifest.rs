//! Manifests: which atoms, bonds, angles and groups to extract.
//!
//! Two on-disk formats are read.
//!
//! # JSON
//!
//! ```json
//! {
//!   "initial_geometry_atom_labels": ["0 P", "1 C"],
//!   "final_geometry_atom_labels": ["0 P", "1 C"],
//!   "bond_length_data_labels": [["0 P", "1 C"]],
//!   "bond_angle_data_labels": [["0 P", "1 C", "2 C"]],
//!   "mulliken_charge_atom_labels": ["0 P"],
//!   "mulliken_charge_sum_atom_label_lists": [["0 P", "3 H"]],
//!   "loewdin_charge_atom_labels": ["0 P"],
//!   "loewdin_charge_sum_label_lists": [["0 P", "3 H"]]
//! }
//! ```
//!
//! Missing fields mean "skip this category". Bond pairs and charge-sum groups
//! are sorted on load; angle triples keep their order.
//!
//! # Line-oriented text
//!
//! The older format keeps each category on a fixed line (0-based lines 4, 7,
//! 10, 13, 16, 19, 22 and 25, in the order of the JSON fields above). Atom
//! lines are comma-separated labels, list lines are `;`-separated groups such
//! as `(0 P,1 C);(2 C,3 H)`. A blank line skips the category.

use crate::category::Category;
use crate::keys::{AngleKey, AtomGroupKey, AtomLabel, BondKey, ExtractionKey};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// I/O error when reading the manifest file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The content does not have the expected shape
    #[error("Format error: {0}")]
    Format(String),
}

type Result<T> = std::result::Result<T, ManifestError>;

/// Categories in the order of the text format's lines.
const TEXT_LAYOUT: [(Category, usize); 8] = [
    (Category::InitialGeometry, 4),
    (Category::FinalGeometry, 7),
    (Category::BondLengths, 10),
    (Category::BondAngles, 13),
    (Category::MullikenCharges, 16),
    (Category::MullikenChargeSums, 19),
    (Category::LoewdinCharges, 22),
    (Category::LoewdinChargeSums, 25),
];

/// Requested keys per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    name: String,
    keys: HashMap<Category, Vec<ExtractionKey>>,
}

impl Manifest {
    /// Empty manifest; every manifest-driven category is skipped.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: HashMap::new(),
        }
    }

    /// Replaces the keys requested for `category`.
    pub fn with_keys(mut self, category: Category, keys: Vec<ExtractionKey>) -> Self {
        self.keys.insert(category, keys);
        self
    }

    /// Manifest name, normally its file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys requested for `category`, empty when the category is skipped.
    pub fn keys(&self, category: Category) -> &[ExtractionKey] {
        self.keys.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Loads a manifest, choosing the format from the extension (`.json` or text).
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let manifest = if is_json {
            Self::from_json(name, &content)?
        } else {
            Self::from_text(name, &content)?
        };
        debug!(
            "Loaded manifest {} ({} categories requested)",
            manifest.name,
            manifest.keys.values().filter(|k| !k.is_empty()).count()
        );
        Ok(manifest)
    }

    /// Parses the JSON format.
    pub fn from_json(name: impl Into<String>, content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content)?;
        let object = root
            .as_object()
            .ok_or_else(|| ManifestError::Format("manifest must be a JSON object".to_string()))?;

        let mut manifest = Self::new(name);
        for category in Category::ALL {
            let Some(field) = category.manifest_field() else {
                continue;
            };
            let Some(value) = object.get(field) else {
                continue;
            };
            let entries = value
                .as_array()
                .ok_or_else(|| ManifestError::Format(format!("'{}' must be an array", field)))?;
            let keys = entries
                .iter()
                .map(|entry| json_key(category, field, entry))
                .collect::<Result<Vec<_>>>()?;
            manifest.keys.insert(category, keys);
        }
        Ok(manifest)
    }

    /// Parses the line-oriented text format.
    pub fn from_text(name: impl Into<String>, content: &str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().collect();
        let mut manifest = Self::new(name);
        for (category, line_number) in TEXT_LAYOUT {
            let line = lines.get(line_number).map_or("", |l| l.trim());
            if line.is_empty() {
                continue;
            }
            let keys = match category {
                Category::BondLengths
                | Category::BondAngles
                | Category::MullikenChargeSums
                | Category::LoewdinChargeSums => text_groups(line)
                    .into_iter()
                    .map(|members| build_key(category, members))
                    .collect::<Result<Vec<_>>>()?,
                _ => line
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(ExtractionKey::atom)
                    .collect(),
            };
            manifest.keys.insert(category, keys);
        }
        Ok(manifest)
    }
}

fn json_key(category: Category, field: &str, entry: &Value) -> Result<ExtractionKey> {
    let label = |v: &Value| {
        v.as_str().map(str::to_string).ok_or_else(|| {
            ManifestError::Format(format!("'{}' contains a non-string label: {}", field, v))
        })
    };
    match category {
        Category::InitialGeometry
        | Category::FinalGeometry
        | Category::MullikenCharges
        | Category::LoewdinCharges => Ok(ExtractionKey::Atom(AtomLabel::new(label(entry)?))),
        _ => {
            let members = entry
                .as_array()
                .ok_or_else(|| {
                    ManifestError::Format(format!("'{}' entries must be arrays", field))
                })?
                .iter()
                .map(label)
                .collect::<Result<Vec<_>>>()?;
            build_key(category, members)
        }
    }
}

/// Turns a list of labels into the key shape of `category`, sorting bonds and groups.
fn build_key(category: Category, members: Vec<String>) -> Result<ExtractionKey> {
    let field = category.manifest_field().unwrap_or_default();
    match (category, members.as_slice()) {
        (Category::BondLengths, [a, b]) => {
            Ok(ExtractionKey::Bond(BondKey::new(a.as_str(), b.as_str()).sorted()))
        }
        (Category::BondAngles, [a, b, c]) => Ok(ExtractionKey::Angle(AngleKey::new(
            a.as_str(),
            b.as_str(),
            c.as_str(),
        ))),
        (Category::MullikenChargeSums | Category::LoewdinChargeSums, [_, ..]) => {
            Ok(ExtractionKey::Group(AtomGroupKey::new(members.iter().map(String::as_str))))
        }
        (Category::BondLengths, _) => Err(ManifestError::Format(format!(
            "'{}' entries must name two atoms, got {:?}",
            field, members
        ))),
        (Category::BondAngles, _) => Err(ManifestError::Format(format!(
            "'{}' entries must name three atoms, got {:?}",
            field, members
        ))),
        _ => Err(ManifestError::Format(format!("'{}' contains an empty group", field))),
    }
}

/// Splits `(0 P,1 C);(2 C,3 H)` into label lists.
fn text_groups(line: &str) -> Vec<Vec<String>> {
    line.split(';')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(|group| {
            group
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sorts_bonds_and_groups_but_not_angles() {
        let manifest = Manifest::from_json(
            "m.json",
            r#"{
                "bond_length_data_labels": [["1 C", "0 P"]],
                "bond_angle_data_labels": [["2 C", "1 C", "0 P"]],
                "mulliken_charge_sum_atom_label_lists": [["3 H", "0 P"]]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.keys(Category::BondLengths), &[ExtractionKey::bond("0 P", "1 C")]);
        assert_eq!(
            manifest.keys(Category::BondAngles),
            &[ExtractionKey::angle("2 C", "1 C", "0 P")]
        );
        assert_eq!(
            manifest.keys(Category::MullikenChargeSums),
            &[ExtractionKey::group(&["0 P", "3 H"])]
        );
        assert!(manifest.keys(Category::InitialGeometry).is_empty());
    }

    #[test]
    fn test_json_shape_errors() {
        let bad = [
            r#"{"bond_length_data_labels": [["0 P"]]}"#,
            r#"{"bond_angle_data_labels": [["0 P", "1 C"]]}"#,
            r#"{"initial_geometry_atom_labels": [1]}"#,
            r#"{"loewdin_charge_sum_label_lists": [[]]}"#,
            r#"{"final_geometry_atom_labels": "0 P"}"#,
            r#"["0 P"]"#,
        ];
        for content in bad {
            assert!(
                matches!(Manifest::from_json("m.json", content), Err(ManifestError::Format(_))),
                "accepted {}",
                content
            );
        }
        assert!(matches!(
            Manifest::from_json("m.json", "{"),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn test_text_manifest() {
        let content = "\
ORCA data extraction inputs
(leave a line blank to skip it)

Initial geometry:
0 P,1 C

Final geometry:


Bond lengths:
(1 C,0 P);(19 C,20 H)

Bond angles:
(0 P,1 C,2 C)

Mulliken charges:
0 P

Mulliken charge sums:
(3 H,0 P)

Loewdin charges:


Loewdin charge sums:
(0 P,1 C,18 H)
";
        let manifest = Manifest::from_text("inputs.txt", content).unwrap();
        assert_eq!(
            manifest.keys(Category::InitialGeometry),
            &[ExtractionKey::atom("0 P"), ExtractionKey::atom("1 C")]
        );
        assert!(manifest.keys(Category::FinalGeometry).is_empty());
        assert_eq!(manifest.keys(Category::BondLengths).len(), 2);
        assert_eq!(
            manifest.keys(Category::BondAngles),
            &[ExtractionKey::angle("0 P", "1 C", "2 C")]
        );
        assert_eq!(
            manifest.keys(Category::MullikenChargeSums),
            &[ExtractionKey::group(&["0 P", "3 H"])]
        );
        assert!(manifest.keys(Category::LoewdinCharges).is_empty());
        assert_eq!(manifest.keys(Category::LoewdinChargeSums).len(), 1);
    }
}
