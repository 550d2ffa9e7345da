//! Serialisation of datasets to JSON, CSV and Excel workbooks.
//!
//! Each dataset becomes one record:
//!
//! ```json
//! {
//!   "script_input_filename": "pph3.json",
//!   "orca_out_filename": "pph3_opt.out",
//!   "final_geometry": { "0_p": { "x": "-1.97759", "y": "2.94534", "z": "0.09181" } },
//!   "bond_lengths": { "(0_p,1_c)": "1.85902" },
//!   "dipole_moments": { "x": "0.11095", "y": "-0.47210", "z": "0.13978", "tot": "0.50470" }
//! }
//! ```
//!
//! CSV and Excel output flatten the same records with `.`-joined column
//! paths (`final_geometry.0_p.x`). Both start with an unnamed row-index
//! column and leave absent values empty. The workbook holds a single sheet
//! with the column paths in its first row.

use crate::dataset::StructureDataset;
use log::info;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, XlsxError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while writing results.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error when writing the output file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Workbook creation or save error
    #[error("Excel error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Nothing to write
    #[error("No datasets to export")]
    Empty,
}

type Result<T> = std::result::Result<T, ExportError>;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values, one row per document.
    #[default]
    Csv,
    /// Pretty-printed JSON array, one object per document.
    Json,
    /// Excel workbook with the CSV layout on one sheet.
    Xlsx,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!(
                "Unsupported output format: {} (expected csv, json or xlsx)",
                other
            )),
        }
    }
}

/// Builds the export record of one dataset.
pub fn dataset_record(dataset: &StructureDataset) -> Result<Map<String, Value>> {
    let mut record = Map::new();
    record.insert(
        "script_input_filename".to_string(),
        Value::String(dataset.manifest_name().to_string()),
    );
    record.insert(
        "orca_out_filename".to_string(),
        Value::String(dataset.document_name().to_string()),
    );
    for category in dataset.categories() {
        let mut section = Map::new();
        for (key, datum) in category.iter() {
            section.insert(key.column_name(), serde_json::to_value(datum)?);
        }
        record.insert(category.category().export_name(), Value::Object(section));
    }
    Ok(record)
}

/// Serialises all datasets as a pretty-printed JSON array.
pub fn to_json_string(datasets: &[StructureDataset]) -> Result<String> {
    let records = datasets
        .iter()
        .map(|d| dataset_record(d).map(Value::Object))
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&Value::Array(records))?)
}

/// Serialises all datasets as CSV, one row per dataset.
pub fn to_csv_string(datasets: &[StructureDataset]) -> Result<String> {
    let bytes = write_csv(&flat_table(datasets)?, Vec::new())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Writes `datasets` to `<output_name>.<ext>` and returns the path written.
pub fn export(
    datasets: &[StructureDataset],
    output_name: &Path,
    format: ExportFormat,
) -> Result<PathBuf> {
    if datasets.is_empty() {
        return Err(ExportError::Empty);
    }
    let path = with_extension(output_name, format);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match format {
        ExportFormat::Csv => {
            write_csv(&flat_table(datasets)?, File::create(&path)?)?;
        }
        ExportFormat::Json => fs::write(&path, to_json_string(datasets)?)?,
        ExportFormat::Xlsx => write_xlsx(&flat_table(datasets)?, &path)?,
    }
    info!("Wrote {} dataset(s) to {}", datasets.len(), path.display());
    Ok(path)
}

fn with_extension(output_name: &Path, format: ExportFormat) -> PathBuf {
    let mut name = output_name.as_os_str().to_owned();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Flattened records: the union of all column paths in first-seen order and
/// one row of cells per dataset.
#[derive(Debug, Default)]
struct FlatTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

fn flat_table(datasets: &[StructureDataset]) -> Result<FlatTable> {
    let records = datasets
        .iter()
        .map(|d| dataset_record(d).map(|r| flatten(&r)))
        .collect::<Result<Vec<_>>>()?;

    let mut table = FlatTable::default();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in &records {
        for (column, _) in record {
            if !positions.contains_key(column) {
                positions.insert(column.clone(), table.columns.len());
                table.columns.push(column.clone());
            }
        }
    }
    for record in records {
        let mut row = vec![None; table.columns.len()];
        for (column, value) in record {
            row[positions[&column]] = value;
        }
        table.rows.push(row);
    }
    Ok(table)
}

fn write_csv<W: io::Write>(table: &FlatTable, out: W) -> Result<W> {
    let mut writer = csv::Writer::from_writer(out);
    // unnamed index column first
    writer.write_record(std::iter::once("").chain(table.columns.iter().map(String::as_str)))?;
    for (i, row) in table.rows.iter().enumerate() {
        let index = i.to_string();
        let cells = row.iter().map(|cell| cell.as_deref().unwrap_or_default());
        writer.write_record(std::iter::once(index.as_str()).chain(cells))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

fn write_xlsx(table: &FlatTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let worksheet = workbook.add_worksheet();

    for (i, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, sheet_column(i + 1)?, column, &header)?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        let sheet_row = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.write_number_with_format(sheet_row, 0, i as f64, &header)?;
        for (j, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string(sheet_row, sheet_column(j + 1)?, value)?;
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

fn sheet_column(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError.into())
}

/// Flattens nested objects into `.`-joined paths; `null` becomes `None`.
fn flatten(record: &Map<String, Value>) -> Vec<(String, Option<String>)> {
    let mut out = Vec::new();
    flatten_into(&mut out, "", record);
    out
}

fn flatten_into(
    out: &mut Vec<(String, Option<String>)>,
    prefix: &str,
    object: &Map<String, Value>,
) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) => flatten_into(out, &path, inner),
            Value::Null => out.push((path, None)),
            Value::String(s) => out.push((path, Some(s.clone()))),
            other => out.push((path, Some(other.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_paths() {
        let record = json!({
            "orca_out_filename": "a.out",
            "final_geometry": { "0_p": { "x": "1.00000", "y": null, "z": "0.00000" } }
        });
        let flat = flatten(record.as_object().unwrap());
        assert_eq!(
            flat,
            vec![
                ("orca_out_filename".to_string(), Some("a.out".to_string())),
                ("final_geometry.0_p.x".to_string(), Some("1.00000".to_string())),
                ("final_geometry.0_p.y".to_string(), None),
                ("final_geometry.0_p.z".to_string(), Some("0.00000".to_string())),
            ]
        );
    }

    #[test]
    fn test_csv_quoting_and_index_column() {
        let table = FlatTable {
            columns: vec!["bond_lengths.(0_p,1_c)".to_string(), "note".to_string()],
            rows: vec![
                vec![Some("1.85902".to_string()), Some("say \"hi\"".to_string())],
                vec![None, Some("-1.97759".to_string())],
            ],
        };
        let text = String::from_utf8(write_csv(&table, Vec::new()).unwrap()).unwrap();
        assert_eq!(
            text,
            ",\"bond_lengths.(0_p,1_c)\",note\n0,1.85902,\"say \"\"hi\"\"\"\n1,,-1.97759\n"
        );
    }

    #[test]
    fn test_flat_table_of_nothing() {
        let table = flat_table(&[]).unwrap();
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("xlsx".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!("Excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(
            with_extension(Path::new("out/ORCA_data_pph3"), ExportFormat::Csv),
            PathBuf::from("out/ORCA_data_pph3.csv")
        );
        assert_eq!(
            with_extension(Path::new("ORCA_data_pph3"), ExportFormat::Xlsx),
            PathBuf::from("ORCA_data_pph3.xlsx")
        );
    }

    #[test]
    fn test_export_rejects_empty() {
        assert!(matches!(
            export(&[], Path::new("nothing"), ExportFormat::Json),
            Err(ExportError::Empty)
        ));
    }
}
