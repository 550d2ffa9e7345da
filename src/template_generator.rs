use crate::category::Category;
use crate::extractors::CARTESIAN_AU;
use crate::record::is_decimal;
use crate::section::{Document, Occurrence};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Template generator for creating JSON manifests from ORCA output files
///
/// Every atom of the first Cartesian (A.U.) table is listed for the geometry
/// and charge categories. Bond, angle and charge-sum lists are left empty for
/// the user to fill in.
pub fn generate_manifest_template<P: AsRef<Path>>(
    report_file: P,
) -> Result<String, Box<dyn std::error::Error>> {
    let report_file = report_file.as_ref();

    if !report_file.exists() {
        return Err(format!("File not found: {}", report_file.display()).into());
    }

    let document = Document::from_file(report_file)?;
    let labels = atom_labels(&document)?;
    Ok(generate_template(&labels)?)
}

/// Lists atom labels ("0 P", "1 C", ...) of the first Cartesian (A.U.) table
pub fn atom_labels(document: &Document) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let block = document
        .locate(&CARTESIAN_AU, Occurrence::First)
        .ok_or_else(|| format!("No Cartesian coordinate table in {}", document.name()))?;

    let labels: Vec<String> = block
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            // NO LB ZA FRAG MASS X Y Z
            if parts.len() < 8 || parts[0].parse::<usize>().is_err() || !is_decimal(parts[7]) {
                return None;
            }
            Some(format!("{} {}", parts[0], parts[1]))
        })
        .collect();

    if labels.is_empty() {
        return Err(format!(
            "Cartesian coordinate table in {} has no atoms",
            document.name()
        )
        .into());
    }
    Ok(labels)
}

fn generate_template(labels: &[String]) -> Result<String, serde_json::Error> {
    let atoms = Value::Array(labels.iter().cloned().map(Value::String).collect());
    let mut manifest = Map::new();
    for category in Category::ALL {
        let Some(field) = category.manifest_field() else {
            continue;
        };
        let value = match category {
            Category::InitialGeometry
            | Category::FinalGeometry
            | Category::MullikenCharges
            | Category::LoewdinCharges => atoms.clone(),
            _ => Value::Array(Vec::new()),
        };
        manifest.insert(field.to_string(), value);
    }
    serde_json::to_string_pretty(&Value::Object(manifest))
}

/// Write template to file
pub fn write_template_to_file<P: AsRef<Path>>(
    template: &str,
    output_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_path = output_path.as_ref();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(output_path, template)?;
    Ok(())
}

/// Get default manifest filename based on the report file
pub fn get_default_output_path<P: AsRef<Path>>(report_file: P) -> PathBuf {
    let stem = report_file
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");

    PathBuf::from(format!("{}_manifest.json", stem))
}
