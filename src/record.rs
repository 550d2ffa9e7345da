//! Row-level parsing inside an isolated section.
//!
//! Rows are located by substring search and split into whitespace-separated
//! fields with a fixed grammar per block type. Atom labels such as `"1 H"` must
//! match as a whole token: the character before the match has to be
//! whitespace (or the start of the block) and the character after it has to be
//! whitespace, a colon or the end of the block. This keeps `"1 H"` from
//! matching inside `"11 H"` and `"1 C"` from matching inside `"1 Cl"`.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    // Plain or exponent-form decimal as printed by ORCA: -0.303926, 236.30256, 1.2E-04
    static ref DECIMAL_RE: Regex =
        Regex::new(r"^[-+]?(?:\d+\.\d*|\.\d+)(?:[eE][-+]?\d+)?$").unwrap();
}

/// Why a row could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// No row carries the requested label.
    #[error("record not found")]
    NotFound,
    /// A row was found but its fields do not follow the expected layout.
    #[error("malformed record: {0}")]
    Malformed(String),
}

type Result<T> = std::result::Result<T, RecordError>;

/// Returns `true` when `token` is a decimal number in ORCA's output format.
pub fn is_decimal(token: &str) -> bool {
    DECIMAL_RE.is_match(token)
}

/// Finds the row labelled `label` and returns the remainder of that line.
pub fn find_row<'a>(block: &'a str, label: &str) -> Option<&'a str> {
    if label.is_empty() {
        return None;
    }
    block.match_indices(label).find_map(|(start, _)| {
        let end = start + label.len();
        let before_ok = block[..start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        let after_ok = block[end..]
            .chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c == ':');
        (before_ok && after_ok).then(|| rest_of_line(&block[end..]))
    })
}

/// Reads the X, Y and Z fields of a `label ZA FRAG MASS X Y Z` row.
pub fn coordinate_fields<'a>(block: &'a str, label: &str) -> Result<[&'a str; 3]> {
    let row = find_row(block, label).ok_or(RecordError::NotFound)?;
    let fields: Vec<&str> = row.split_whitespace().collect();
    if fields.len() < 6 {
        return Err(RecordError::Malformed(format!(
            "expected 6 fields after '{}', found {}",
            label,
            fields.len()
        )));
    }
    let xyz = [fields[3], fields[4], fields[5]];
    for value in xyz {
        require_decimal(value)?;
    }
    Ok(xyz)
}

/// Reads the charge of a `label : charge` row.
pub fn charge_field<'a>(block: &'a str, label: &str) -> Result<&'a str> {
    let row = find_row(block, label).ok_or(RecordError::NotFound)?;
    let value = row
        .trim_start()
        .strip_prefix(':')
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(|| RecordError::Malformed(format!("no charge after '{}'", label)))?;
    require_decimal(value)
}

/// Reads `count` numbers following the first line containing `prefix`.
///
/// The prefix is matched verbatim (no token boundary) and an optional colon
/// after it is skipped, so `"Magnitude (a.u.)"` reads the value of
/// `Magnitude (a.u.)       :      0.50470`.
pub fn values_after<'a>(block: &'a str, prefix: &str, count: usize) -> Result<Vec<&'a str>> {
    let start = block.find(prefix).ok_or(RecordError::NotFound)? + prefix.len();
    let rest = rest_of_line(&block[start..]).trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let values: Vec<&str> = rest.split_whitespace().take(count).collect();
    if values.len() < count {
        return Err(RecordError::Malformed(format!(
            "expected {} values after '{}', found {}",
            count,
            prefix,
            values.len()
        )));
    }
    values.into_iter().map(require_decimal).collect()
}

/// Reads a `rows` x `cols` numeric matrix from the non-empty lines after `heading`.
pub fn matrix_after<'a>(
    block: &'a str,
    heading: &str,
    rows: usize,
    cols: usize,
) -> Result<Vec<&'a str>> {
    let start = block.find(heading).ok_or(RecordError::NotFound)? + heading.len();
    let body = &block[start..];
    let mut values = Vec::with_capacity(rows * cols);
    // skip the remainder of the heading line
    for line in body.lines().skip(1).filter(|l| !l.trim().is_empty()).take(rows) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < cols {
            return Err(RecordError::Malformed(format!(
                "expected {} columns under '{}', found {}",
                cols,
                heading,
                fields.len()
            )));
        }
        for &value in &fields[..cols] {
            values.push(require_decimal(value)?);
        }
    }
    if values.len() < rows * cols {
        return Err(RecordError::Malformed(format!(
            "expected {} rows under '{}'",
            rows, heading
        )));
    }
    Ok(values)
}

/// One row of an `ORBITAL ENERGIES` table.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalRow<'a> {
    /// Orbital index.
    pub number: usize,
    /// Occupation number.
    pub occupation: f64,
    /// Energy in Hartree, as printed.
    pub energy_eh: &'a str,
    /// Energy in electron volts, as printed.
    pub energy_ev: &'a str,
}

/// Parses every `NO OCC E(Eh) E(eV)` row of an orbital energy table.
///
/// Header and separator lines are skipped.
pub fn orbital_rows(block: &str) -> Vec<OrbitalRow<'_>> {
    block
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return None;
            }
            let number = fields[0].parse().ok()?;
            let occupation = fields[1].parse().ok()?;
            if !is_decimal(fields[2]) || !is_decimal(fields[3]) {
                return None;
            }
            Some(OrbitalRow {
                number,
                occupation,
                energy_eh: fields[2],
                energy_ev: fields[3],
            })
        })
        .collect()
}

/// Finds the HOMO and LUMO rows.
///
/// The HOMO is the occupied row directly followed by an empty one; when a
/// table lists several spin channels the last such transition wins.
pub fn frontier_orbitals<'a, 'b>(
    rows: &'b [OrbitalRow<'a>],
) -> Option<(&'b OrbitalRow<'a>, &'b OrbitalRow<'a>)> {
    rows.windows(2)
        .rev()
        .find(|pair| pair[0].occupation > 0.0 && pair[1].occupation == 0.0)
        .map(|pair| (&pair[0], &pair[1]))
}

fn require_decimal(value: &str) -> Result<&str> {
    if is_decimal(value) {
        Ok(value)
    } else {
        Err(RecordError::Malformed(format!("'{}' is not a number", value)))
    }
}

fn rest_of_line(text: &str) -> &str {
    let end = text.find('\n').unwrap_or(text.len());
    text[..end].trim_end_matches('\r')
}
