//! One extractor per data category.
//!
//! Every category implements [`Extractor`]: given a document and the keys
//! requested for it, return one value per key in the same order. Absent
//! values are recorded in the [`DiagnosticLog`] and never abort the run.
//! [`extractor_for`] maps a [`Category`] to its extractor.
//!
//! Section boundaries and the occurrence each category reads:
//!
//! | Category | Block | Occurrence |
//! |----------|-------|------------|
//! | Initial Geometry | `CARTESIAN COORDINATES (A.U.)` | first |
//! | Final Geometry, Bond Lengths, Bond Angles | `CARTESIAN COORDINATES (A.U.)` | last |
//! | Mulliken / Loewdin charges and sums | `... ATOMIC CHARGES` | last |
//! | HOMO LUMO Energies | `ORBITAL ENERGIES` | last |
//! | Dipole Moments | `DIPOLE MOMENT` | first |
//! | Polarizability | `THE POLARIZABILITY TENSOR` | first |

use crate::category::{Category, DIPOLE_FIELDS, HOMO_LUMO_FIELDS, POLARIZABILITY_FIELDS};
use crate::dataset::Datum;
use crate::diagnostics::{DiagnosticLog, Reason};
use crate::geometry::{self, Coordinate};
use crate::keys::{AtomLabel, ExtractionKey};
use crate::record::{self, RecordError};
use crate::section::{Document, Occurrence, SectionMarkers};
use log::debug;
use nalgebra::Vector3;

/// Cartesian geometry table in Bohr.
pub const CARTESIAN_AU: SectionMarkers =
    SectionMarkers::new("CARTESIAN COORDINATES (A.U.)", "INTERNAL COORDINATES (ANGSTROEM)");
/// Mulliken atomic charge table.
pub const MULLIKEN_CHARGES: SectionMarkers =
    SectionMarkers::new("MULLIKEN ATOMIC CHARGES", "MULLIKEN REDUCED ORBITAL CHARGES");
/// Loewdin atomic charge table.
pub const LOEWDIN_CHARGES: SectionMarkers =
    SectionMarkers::new("LOEWDIN ATOMIC CHARGES", "LOEWDIN REDUCED ORBITAL CHARGES");
/// Orbital energy table.
pub const ORBITAL_ENERGIES: SectionMarkers =
    SectionMarkers::new("ORBITAL ENERGIES", "MULLIKEN POPULATION ANALYSIS");
/// Dipole moment summary.
pub const DIPOLE_MOMENT: SectionMarkers =
    SectionMarkers::new("DIPOLE MOMENT", "Rotational spectrum");
/// Static polarizability output.
pub const POLARIZABILITY_TENSOR: SectionMarkers =
    SectionMarkers::new("THE POLARIZABILITY TENSOR", "Timings for individual modules:");

const RAW_TENSOR_HEADING: &str = "The raw cartesian tensor (atomic units):";
const ISOTROPIC_PREFIX: &str = "Isotropic polarizability";
const TOTAL_DIPOLE_PREFIX: &str = "Total Dipole Moment";
const MAGNITUDE_PREFIX: &str = "Magnitude (a.u.)";

/// Extracts the values of one category from a document.
pub trait Extractor {
    /// Category this extractor fills.
    fn category(&self) -> Category;

    /// Returns one `(key, value)` pair per requested key, in request order.
    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)>;
}

/// Returns the extractor responsible for `category`.
pub fn extractor_for(category: Category) -> Box<dyn Extractor> {
    match category {
        Category::InitialGeometry => Box::new(GeometryExtractor::initial()),
        Category::FinalGeometry => Box::new(GeometryExtractor::last()),
        Category::BondLengths => Box::new(BondLengthExtractor),
        Category::BondAngles => Box::new(BondAngleExtractor),
        Category::Polarizability => Box::new(PolarizabilityExtractor),
        Category::DipoleMoments => Box::new(DipoleMomentExtractor),
        Category::HomoLumoEnergies => Box::new(OrbitalEnergyExtractor),
        Category::MullikenCharges => Box::new(ChargeExtractor(ChargeScheme::Mulliken)),
        Category::MullikenChargeSums => Box::new(ChargeSumExtractor(ChargeScheme::Mulliken)),
        Category::LoewdinCharges => Box::new(ChargeExtractor(ChargeScheme::Loewdin)),
        Category::LoewdinChargeSums => Box::new(ChargeSumExtractor(ChargeScheme::Loewdin)),
    }
}

/// Atom coordinates from the first or last geometry block.
#[derive(Debug, Clone, Copy)]
pub struct GeometryExtractor {
    category: Category,
    occurrence: Occurrence,
}

impl GeometryExtractor {
    /// Reads the input geometry.
    pub fn initial() -> Self {
        Self {
            category: Category::InitialGeometry,
            occurrence: Occurrence::First,
        }
    }

    /// Reads the last geometry printed.
    pub fn last() -> Self {
        Self {
            category: Category::FinalGeometry,
            occurrence: Occurrence::Last,
        }
    }
}

impl Extractor for GeometryExtractor {
    fn category(&self) -> Category {
        self.category
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(&CARTESIAN_AU, self.occurrence);
        let mut data = Vec::with_capacity(keys.len());
        for key in keys {
            let result = match (key, block.as_deref()) {
                (ExtractionKey::Atom(label), Some(block)) => atom_coordinate(block, label),
                (ExtractionKey::Atom(_), None) => Err(Reason::SectionNotFound),
                _ => Err(Reason::UnsupportedKey),
            };
            let coordinate = result.unwrap_or_else(|reason| {
                log.record(self.category, key, reason);
                Coordinate::absent()
            });
            data.push((key.clone(), Datum::Coordinate(coordinate)));
        }
        data
    }
}

/// Distances between atom pairs of the last geometry block.
#[derive(Debug, Clone, Copy)]
pub struct BondLengthExtractor;

impl Extractor for BondLengthExtractor {
    fn category(&self) -> Category {
        Category::BondLengths
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(&CARTESIAN_AU, Occurrence::Last);
        derive_scalars(self.category(), keys, log, |key| {
            let block = block.as_deref().ok_or(Reason::SectionNotFound)?;
            match key {
                ExtractionKey::Bond(bond) => {
                    let [a, b] = bond.atoms();
                    let p0 = atom_position(block, a)?;
                    let p1 = atom_position(block, b)?;
                    Ok(geometry::distance(&p0, &p1))
                }
                _ => Err(Reason::UnsupportedKey),
            }
        })
    }
}

/// Angles at the middle atom of atom triples of the last geometry block.
#[derive(Debug, Clone, Copy)]
pub struct BondAngleExtractor;

impl Extractor for BondAngleExtractor {
    fn category(&self) -> Category {
        Category::BondAngles
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(&CARTESIAN_AU, Occurrence::Last);
        derive_scalars(self.category(), keys, log, |key| {
            let block = block.as_deref().ok_or(Reason::SectionNotFound)?;
            match key {
                ExtractionKey::Angle(angle) => {
                    let [a, b, c] = angle.atoms();
                    let p0 = atom_position(block, a)?;
                    let p1 = atom_position(block, b)?;
                    let p2 = atom_position(block, c)?;
                    geometry::angle(&p0, &p1, &p2).ok_or(Reason::DegenerateGeometry)
                }
                _ => Err(Reason::UnsupportedKey),
            }
        })
    }
}

/// Population analysis scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeScheme {
    /// Mulliken population analysis.
    Mulliken,
    /// Loewdin population analysis.
    Loewdin,
}

impl ChargeScheme {
    /// Section holding the atomic charges of this scheme.
    pub fn markers(&self) -> &'static SectionMarkers {
        match self {
            ChargeScheme::Mulliken => &MULLIKEN_CHARGES,
            ChargeScheme::Loewdin => &LOEWDIN_CHARGES,
        }
    }
}

/// Atomic charges from the last population analysis, stored verbatim.
#[derive(Debug, Clone, Copy)]
pub struct ChargeExtractor(pub ChargeScheme);

impl Extractor for ChargeExtractor {
    fn category(&self) -> Category {
        match self.0 {
            ChargeScheme::Mulliken => Category::MullikenCharges,
            ChargeScheme::Loewdin => Category::LoewdinCharges,
        }
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(self.0.markers(), Occurrence::Last);
        derive_scalars(self.category(), keys, log, |key| {
            let block = block.as_deref().ok_or(Reason::SectionNotFound)?;
            match key {
                ExtractionKey::Atom(label) => {
                    Ok(record::charge_field(block, label.as_str())?.to_string())
                }
                _ => Err(Reason::UnsupportedKey),
            }
        })
    }
}

/// Sums of atomic charges over atom groups, rounded like coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ChargeSumExtractor(pub ChargeScheme);

impl Extractor for ChargeSumExtractor {
    fn category(&self) -> Category {
        match self.0 {
            ChargeScheme::Mulliken => Category::MullikenChargeSums,
            ChargeScheme::Loewdin => Category::LoewdinChargeSums,
        }
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(self.0.markers(), Occurrence::Last);
        derive_scalars(self.category(), keys, log, |key| {
            let block = block.as_deref().ok_or(Reason::SectionNotFound)?;
            let ExtractionKey::Group(group) = key else {
                return Err(Reason::UnsupportedKey);
            };
            let mut sum = 0.0;
            for atom in group.members() {
                let charge = record::charge_field(block, atom.as_str())
                    .ok()
                    .and_then(|c| c.parse::<f64>().ok())
                    .ok_or_else(|| Reason::MissingDependency { atom: atom.clone() })?;
                sum += charge;
            }
            Ok(geometry::format_fixed(sum))
        })
    }
}

/// Raw Cartesian tensor and isotropic polarizability.
#[derive(Debug, Clone, Copy)]
pub struct PolarizabilityExtractor;

impl Extractor for PolarizabilityExtractor {
    fn category(&self) -> Category {
        Category::Polarizability
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(&POLARIZABILITY_TENSOR, Occurrence::First);
        let fields = block.as_deref().map(|block| {
            let mut fields = record_fields(
                &POLARIZABILITY_FIELDS[..9],
                record::matrix_after(block, RAW_TENSOR_HEADING, 3, 3),
            );
            fields.extend(record_fields(
                &POLARIZABILITY_FIELDS[9..],
                record::values_after(block, ISOTROPIC_PREFIX, 1),
            ));
            fields
        });
        emit_record(self.category(), keys, log, fields)
    }
}

/// Total dipole moment vector and magnitude in atomic units.
#[derive(Debug, Clone, Copy)]
pub struct DipoleMomentExtractor;

impl Extractor for DipoleMomentExtractor {
    fn category(&self) -> Category {
        Category::DipoleMoments
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(&DIPOLE_MOMENT, Occurrence::First);
        let fields = block.as_deref().map(|block| {
            let mut fields = record_fields(
                &DIPOLE_FIELDS[..3],
                record::values_after(block, TOTAL_DIPOLE_PREFIX, 3),
            );
            fields.extend(record_fields(
                &DIPOLE_FIELDS[3..],
                record::values_after(block, MAGNITUDE_PREFIX, 1),
            ));
            fields
        });
        emit_record(self.category(), keys, log, fields)
    }
}

/// HOMO and LUMO energies in eV from the last orbital energy table.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalEnergyExtractor;

impl Extractor for OrbitalEnergyExtractor {
    fn category(&self) -> Category {
        Category::HomoLumoEnergies
    }

    fn extract(
        &self,
        document: &Document,
        keys: &[ExtractionKey],
        log: &mut DiagnosticLog,
    ) -> Vec<(ExtractionKey, Datum)> {
        let block = document.locate(&ORBITAL_ENERGIES, Occurrence::Last);
        let fields = block.as_deref().map(|block| {
            let rows = record::orbital_rows(block);
            let frontier = record::frontier_orbitals(&rows)
                .map(|(homo, lumo)| vec![homo.energy_ev, lumo.energy_ev])
                .ok_or(RecordError::NotFound);
            record_fields(&HOMO_LUMO_FIELDS, frontier)
        });
        emit_record(self.category(), keys, log, fields)
    }
}

type FieldValues = Vec<(&'static str, Result<String, Reason>)>;

fn record_fields(names: &[&'static str], values: Result<Vec<&str>, RecordError>) -> FieldValues {
    match values {
        Ok(values) => names
            .iter()
            .zip(values)
            .map(|(name, value)| (*name, Ok(value.to_string())))
            .collect(),
        Err(err) => {
            let reason = Reason::from(err);
            names.iter().map(|name| (*name, Err(reason.clone()))).collect()
        }
    }
}

fn emit_record(
    category: Category,
    keys: &[ExtractionKey],
    log: &mut DiagnosticLog,
    fields: Option<FieldValues>,
) -> Vec<(ExtractionKey, Datum)> {
    derive_scalars(category, keys, log, |key| {
        let fields = fields.as_ref().ok_or(Reason::SectionNotFound)?;
        let ExtractionKey::Field(name) = key else {
            return Err(Reason::UnsupportedKey);
        };
        fields
            .iter()
            .find(|(field, _)| *field == name.as_str())
            .map_or(Err(Reason::UnsupportedKey), |(_, value)| value.clone())
    })
}

fn derive_scalars<F>(
    category: Category,
    keys: &[ExtractionKey],
    log: &mut DiagnosticLog,
    mut derive: F,
) -> Vec<(ExtractionKey, Datum)>
where
    F: FnMut(&ExtractionKey) -> Result<String, Reason>,
{
    let mut data = Vec::with_capacity(keys.len());
    for key in keys {
        let value = match derive(key) {
            Ok(value) => {
                debug!("{} {} = {}", category, key, value);
                Some(value)
            }
            Err(reason) => {
                log.record(category, key, reason);
                None
            }
        };
        data.push((key.clone(), Datum::Scalar(value)));
    }
    data
}

fn atom_coordinate(block: &str, label: &AtomLabel) -> Result<Coordinate, Reason> {
    let [x, y, z] = record::coordinate_fields(block, label.as_str())?;
    let convert = |v: &str| {
        geometry::to_angstrom(v).map_err(|e| Reason::MalformedRecord(e.to_string()))
    };
    Ok(Coordinate::new(convert(x)?, convert(y)?, convert(z)?))
}

fn atom_position(block: &str, label: &AtomLabel) -> Result<Vector3<f64>, Reason> {
    atom_coordinate(block, label)
        .ok()
        .and_then(|c| c.to_vector())
        .ok_or_else(|| Reason::MissingDependency {
            atom: label.clone(),
        })
}
