//! The fixed set of data categories an extraction run can produce.

use std::fmt;
use std::str::FromStr;

/// Named section of a [`StructureDataset`](crate::dataset::StructureDataset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Atom coordinates from the first geometry block.
    InitialGeometry,
    /// Atom coordinates from the last geometry block.
    FinalGeometry,
    /// Distances between atom pairs of the final geometry.
    BondLengths,
    /// Angles between atom triples of the final geometry.
    BondAngles,
    /// Polarizability tensor and isotropic value.
    Polarizability,
    /// Total dipole moment components and magnitude.
    DipoleMoments,
    /// Frontier orbital energies.
    HomoLumoEnergies,
    /// Mulliken atomic charges.
    MullikenCharges,
    /// Sums of Mulliken charges over atom groups.
    MullikenChargeSums,
    /// Loewdin atomic charges.
    LoewdinCharges,
    /// Sums of Loewdin charges over atom groups.
    LoewdinChargeSums,
}

/// Fields of the polarizability record.
pub const POLARIZABILITY_FIELDS: [&str; 10] = [
    "alpha_xx", "alpha_xy", "alpha_xz", "alpha_yx", "alpha_yy", "alpha_yz", "alpha_zx", "alpha_zy",
    "alpha_zz", "alpha",
];

/// Fields of the dipole moment record.
pub const DIPOLE_FIELDS: [&str; 4] = ["X", "Y", "Z", "Tot"];

/// Fields of the frontier orbital record.
pub const HOMO_LUMO_FIELDS: [&str; 2] = ["HOMO energy", "LUMO energy"];

impl Category {
    /// Every category, in dataset order.
    pub const ALL: [Category; 11] = [
        Category::InitialGeometry,
        Category::FinalGeometry,
        Category::BondLengths,
        Category::BondAngles,
        Category::Polarizability,
        Category::DipoleMoments,
        Category::HomoLumoEnergies,
        Category::MullikenCharges,
        Category::MullikenChargeSums,
        Category::LoewdinCharges,
        Category::LoewdinChargeSums,
    ];

    /// Display name of the section.
    pub fn name(&self) -> &'static str {
        match self {
            Category::InitialGeometry => "Initial Geometry",
            Category::FinalGeometry => "Final Geometry",
            Category::BondLengths => "Bond Lengths",
            Category::BondAngles => "Bond Angles",
            Category::Polarizability => "Polarizability",
            Category::DipoleMoments => "Dipole Moments",
            Category::HomoLumoEnergies => "HOMO LUMO Energies",
            Category::MullikenCharges => "Mulliken Charges",
            Category::MullikenChargeSums => "Mulliken Charge Sums",
            Category::LoewdinCharges => "Loewdin Charges",
            Category::LoewdinChargeSums => "Loewdin Charge Sums",
        }
    }

    /// Section name in export form, e.g. `"homo_lumo_energies"`.
    pub fn export_name(&self) -> String {
        self.name().to_lowercase().replace(' ', "_")
    }

    /// JSON manifest field listing this category's keys, if it takes any.
    pub fn manifest_field(&self) -> Option<&'static str> {
        match self {
            Category::InitialGeometry => Some("initial_geometry_atom_labels"),
            Category::FinalGeometry => Some("final_geometry_atom_labels"),
            Category::BondLengths => Some("bond_length_data_labels"),
            Category::BondAngles => Some("bond_angle_data_labels"),
            Category::MullikenCharges => Some("mulliken_charge_atom_labels"),
            Category::MullikenChargeSums => Some("mulliken_charge_sum_atom_label_lists"),
            Category::LoewdinCharges => Some("loewdin_charge_atom_labels"),
            Category::LoewdinChargeSums => Some("loewdin_charge_sum_label_lists"),
            Category::Polarizability | Category::DipoleMoments | Category::HomoLumoEnergies => {
                None
            }
        }
    }

    /// Returns `true` for categories whose keys come from a manifest.
    pub fn takes_inputs(&self) -> bool {
        self.manifest_field().is_some()
    }

    /// Fixed field names of a record category; empty for manifest-driven ones.
    pub fn fixed_fields(&self) -> &'static [&'static str] {
        match self {
            Category::Polarizability => &POLARIZABILITY_FIELDS,
            Category::DipoleMoments => &DIPOLE_FIELDS,
            Category::HomoLumoEnergies => &HOMO_LUMO_FIELDS,
            _ => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the display name, the export name or the manifest field.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['/', '_'], " ");
        Category::ALL
            .iter()
            .copied()
            .find(|c| {
                c.name().to_lowercase() == wanted
                    || c.manifest_field().map_or(false, |f| f == s.trim())
            })
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
