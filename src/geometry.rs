//! Unit conversion and derived geometry.
//!
//! Coordinates are read from ORCA in Bohr, converted to Angstrom and stored as
//! fixed-precision strings (five decimals). Bond lengths and angles are
//! computed from those stored strings, so a derived value is always
//! reproducible from the exported coordinates.
//!
//! # Examples
//!
//! ```
//! use odx::geometry::{angle, distance, to_angstrom};
//! use nalgebra::Vector3;
//!
//! assert_eq!(to_angstrom("1.0").unwrap(), "0.52918");
//!
//! let a = Vector3::new(0.0, 0.0, 0.0);
//! let b = Vector3::new(1.0, 0.0, 0.0);
//! let c = Vector3::new(1.0, 1.0, 0.0);
//! assert_eq!(distance(&a, &b), "1.00000");
//! assert_eq!(angle(&a, &b, &c).unwrap(), "90.00000");
//! ```

use nalgebra::Vector3;
use serde::Serialize;
use std::num::ParseFloatError;

/// Bohr to Angstrom factor used for every stored coordinate.
pub const BOHR_TO_ANGSTROM: f64 = 0.529177;

/// Number of decimals kept for every converted or derived value.
pub const PRECISION: i32 = 5;

/// Rounds half away from zero to [`PRECISION`] decimals.
pub fn round_fixed(value: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    let rounded = (value * scale).round() / scale;
    // avoid printing "-0.00000"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formats `value` with exactly [`PRECISION`] decimals.
pub fn format_fixed(value: f64) -> String {
    format!("{:.*}", PRECISION as usize, round_fixed(value))
}

/// Converts a coordinate printed in Bohr into an Angstrom string.
pub fn to_angstrom(value_in_au: &str) -> Result<String, ParseFloatError> {
    let value: f64 = value_in_au.trim().parse()?;
    Ok(format_fixed(value * BOHR_TO_ANGSTROM))
}

/// Cartesian position in Angstrom; each component may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Coordinate {
    /// X component.
    pub x: Option<String>,
    /// Y component.
    pub y: Option<String>,
    /// Z component.
    pub z: Option<String>,
}

impl Coordinate {
    /// A coordinate with every component present.
    pub fn new(x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            z: Some(z.into()),
        }
    }

    /// A coordinate for an atom that could not be located.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Returns `true` when no component was found.
    pub fn is_absent(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Parses the stored components, or `None` if any is missing or not numeric.
    pub fn to_vector(&self) -> Option<Vector3<f64>> {
        let parse = |c: &Option<String>| c.as_deref().and_then(|s| s.parse::<f64>().ok());
        Some(Vector3::new(parse(&self.x)?, parse(&self.y)?, parse(&self.z)?))
    }
}

/// Euclidean distance between two positions.
pub fn distance(p0: &Vector3<f64>, p1: &Vector3<f64>) -> String {
    format_fixed((p0 - p1).norm())
}

/// Bond angle at `p1` in degrees, as `180 - acos(v01 . v12 / |v01||v12|)`
/// with `v01 = p0 - p1` and `v12 = p1 - p2`.
///
/// `v12` points from the third atom towards the vertex, so the supplement of
/// the raw vector angle is the interior angle `p0-p1-p2`. Returns `None` when
/// two of the atoms coincide.
pub fn angle(p0: &Vector3<f64>, p1: &Vector3<f64>, p2: &Vector3<f64>) -> Option<String> {
    let v01 = p0 - p1;
    let v12 = p1 - p2;
    let norms = v01.norm() * v12.norm();
    if norms == 0.0 {
        return None;
    }
    let cosine = (v01.dot(&v12) / norms).clamp(-1.0, 1.0);
    Some(format_fixed(180.0 - cosine.acos().to_degrees()))
}
