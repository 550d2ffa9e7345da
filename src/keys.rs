//! Extraction keys and their canonical lookup forms.
//!
//! Different key shapes have different symmetry:
//!
//! | Key | Equivalent forms |
//! |-----|------------------|
//! | [`AtomLabel`] | itself |
//! | [`BondKey`] | `(A,B)` and `(B,A)` |
//! | [`AngleKey`] | `(A,B,C)` and `(C,B,A)` only |
//! | [`AtomGroupKey`] | every permutation; stored sorted |
//!
//! [`ExtractionKey::lookup_forms`] lists the forms a resolver should try, in
//! order, for a requested key.

use std::fmt;

/// Atom token made of an index and an element symbol, e.g. `"12 C"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomLabel(String);

impl AtomLabel {
    /// Creates a label, trimming surrounding whitespace.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_string())
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased label with spaces replaced by underscores (`"0 P"` -> `"0_p"`).
    pub fn column_name(&self) -> String {
        self.0.to_lowercase().replace(' ', "_")
    }
}

impl fmt::Display for AtomLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AtomLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Unordered atom pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondKey(pub AtomLabel, pub AtomLabel);

impl BondKey {
    /// Pair in the order given.
    pub fn new(a: impl Into<AtomLabel>, b: impl Into<AtomLabel>) -> Self {
        Self(a.into(), b.into())
    }

    /// Same pair, members swapped.
    pub fn reversed(&self) -> Self {
        Self(self.1.clone(), self.0.clone())
    }

    /// Pair with members in lexicographic order.
    pub fn sorted(&self) -> Self {
        if self.0 <= self.1 {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Members in order.
    pub fn atoms(&self) -> [&AtomLabel; 2] {
        [&self.0, &self.1]
    }
}

/// Ordered atom triple; the middle atom is the vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AngleKey(pub AtomLabel, pub AtomLabel, pub AtomLabel);

impl AngleKey {
    /// Triple in the order given.
    pub fn new(a: impl Into<AtomLabel>, b: impl Into<AtomLabel>, c: impl Into<AtomLabel>) -> Self {
        Self(a.into(), b.into(), c.into())
    }

    /// End-to-end reversal, `(C,B,A)` for `(A,B,C)`.
    pub fn reversed(&self) -> Self {
        Self(self.2.clone(), self.1.clone(), self.0.clone())
    }

    /// Members in order.
    pub fn atoms(&self) -> [&AtomLabel; 3] {
        [&self.0, &self.1, &self.2]
    }
}

/// Unordered set of atoms, kept in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomGroupKey(Vec<AtomLabel>);

impl AtomGroupKey {
    /// Builds the canonical (sorted) group from members in any order.
    pub fn new<I, L>(members: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<AtomLabel>,
    {
        let mut members: Vec<AtomLabel> = members.into_iter().map(Into::into).collect();
        members.sort();
        Self(members)
    }

    /// Sorted members.
    pub fn members(&self) -> &[AtomLabel] {
        &self.0
    }
}

/// Anything a category can be asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtractionKey {
    /// A single atom (geometry and charge categories).
    Atom(AtomLabel),
    /// An atom pair (bond lengths).
    Bond(BondKey),
    /// An atom triple (bond angles).
    Angle(AngleKey),
    /// An atom set (charge sums).
    Group(AtomGroupKey),
    /// A fixed field of a record category, e.g. `"alpha_xx"` or `"HOMO energy"`.
    Field(String),
}

impl ExtractionKey {
    /// Shorthand for [`ExtractionKey::Atom`].
    pub fn atom(label: &str) -> Self {
        Self::Atom(AtomLabel::new(label))
    }

    /// Shorthand for [`ExtractionKey::Bond`].
    pub fn bond(a: &str, b: &str) -> Self {
        Self::Bond(BondKey::new(a, b))
    }

    /// Shorthand for [`ExtractionKey::Angle`].
    pub fn angle(a: &str, b: &str, c: &str) -> Self {
        Self::Angle(AngleKey::new(a, b, c))
    }

    /// Shorthand for [`ExtractionKey::Group`].
    pub fn group(members: &[&str]) -> Self {
        Self::Group(AtomGroupKey::new(members.iter().copied()))
    }

    /// Shorthand for [`ExtractionKey::Field`].
    pub fn field(name: &str) -> Self {
        Self::Field(name.to_string())
    }

    /// Forms to try, in order, when looking this key up.
    ///
    /// Bonds and angles add their reversal; groups are already canonical.
    pub fn lookup_forms(&self) -> Vec<ExtractionKey> {
        match self {
            Self::Bond(bond) => vec![self.clone(), Self::Bond(bond.reversed())],
            Self::Angle(angle) => vec![self.clone(), Self::Angle(angle.reversed())],
            Self::Atom(_) | Self::Group(_) | Self::Field(_) => vec![self.clone()],
        }
    }

    /// Normalised name used as an export column.
    ///
    /// ```
    /// use odx::keys::ExtractionKey;
    ///
    /// assert_eq!(ExtractionKey::atom("0 P").column_name(), "0_p");
    /// assert_eq!(ExtractionKey::bond("0 P", "1 C").column_name(), "(0_p,1_c)");
    /// assert_eq!(ExtractionKey::group(&["3 H"]).column_name(), "(3_h,)");
    /// assert_eq!(ExtractionKey::field("HOMO energy").column_name(), "homo_energy");
    /// ```
    pub fn column_name(&self) -> String {
        match self {
            Self::Atom(label) => label.column_name(),
            Self::Bond(bond) => tuple_column(&bond.atoms()),
            Self::Angle(angle) => tuple_column(&angle.atoms()),
            Self::Group(group) => {
                let members: Vec<&AtomLabel> = group.members().iter().collect();
                tuple_column(&members)
            }
            Self::Field(name) => name.to_lowercase().replace(' ', "_"),
        }
    }
}

fn tuple_column(atoms: &[&AtomLabel]) -> String {
    let names: Vec<String> = atoms.iter().map(|a| a.column_name()).collect();
    if names.len() == 1 {
        format!("({},)", names[0])
    } else {
        format!("({})", names.join(","))
    }
}

impl fmt::Display for ExtractionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let join = |atoms: &[&AtomLabel]| {
            atoms
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Self::Atom(label) => write!(f, "{}", label),
            Self::Bond(bond) => write!(f, "({})", join(&bond.atoms()[..])),
            Self::Angle(angle) => write!(f, "({})", join(&angle.atoms()[..])),
            Self::Group(group) => {
                let members: Vec<&AtomLabel> = group.members().iter().collect();
                write!(f, "({})", join(&members[..]))
            }
            Self::Field(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bond_lookup_forms() {
        let key = ExtractionKey::bond("1 C", "0 P");
        assert_eq!(
            key.lookup_forms(),
            vec![ExtractionKey::bond("1 C", "0 P"), ExtractionKey::bond("0 P", "1 C")]
        );
        assert_eq!(BondKey::new("1 C", "0 P").sorted(), BondKey::new("0 P", "1 C"));
    }

    #[test]
    fn test_angle_lookup_forms_only_full_reversal() {
        let key = ExtractionKey::angle("0 P", "1 C", "2 C");
        let forms = key.lookup_forms();
        assert_eq!(forms.len(), 2);
        assert!(forms.contains(&ExtractionKey::angle("2 C", "1 C", "0 P")));
        assert!(!forms.contains(&ExtractionKey::angle("1 C", "0 P", "2 C")));
    }

    #[test]
    fn test_group_is_canonical() {
        let a = ExtractionKey::group(&["3 H", "0 P", "19 C"]);
        let b = ExtractionKey::group(&["19 C", "3 H", "0 P"]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "(0 P, 19 C, 3 H)");
    }

    #[test]
    fn test_display() {
        assert_eq!(ExtractionKey::atom(" 0 P ").to_string(), "0 P");
        assert_eq!(ExtractionKey::angle("0 P", "1 C", "2 C").to_string(), "(0 P, 1 C, 2 C)");
        assert_eq!(ExtractionKey::field("Tot").to_string(), "Tot");
    }

    #[test]
    fn test_column_names() {
        assert_eq!(ExtractionKey::angle("0 P", "1 C", "2 C").column_name(), "(0_p,1_c,2_c)");
        assert_eq!(ExtractionKey::field("X").column_name(), "x");
    }
}
