use odx::category::Category;
use odx::dataset::{Datum, LookupError, StructureDataset};
use odx::diagnostics::Reason;
use odx::geometry::Coordinate;
use odx::keys::{AtomLabel, ExtractionKey};
use odx::manifest::Manifest;
use odx::section::Document;
use std::path::Path;

fn document(name: &str) -> Document {
    Document::from_file(&Path::new("tests/data").join(name)).unwrap()
}

fn manifest(name: &str) -> Manifest {
    Manifest::load(&Path::new("tests/data").join(name)).unwrap()
}

fn scalar(dataset: &StructureDataset, category: Category, key: ExtractionKey) -> Option<String> {
    dataset
        .datum(category, &key)
        .unwrap()
        .as_scalar()
        .map(str::to_string)
}

fn assert_angle(dataset: &StructureDataset, key: ExtractionKey, expected: f64) {
    let value: f64 = scalar(dataset, Category::BondAngles, key).unwrap().parse().unwrap();
    assert!((value - expected).abs() < 1e-4, "angle {} != {}", value, expected);
}

#[test]
fn test_geometry_first_and_last_blocks() {
    let dataset = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));

    assert_eq!(
        dataset.datum(Category::InitialGeometry, &ExtractionKey::atom("0 P")).unwrap(),
        Datum::Coordinate(Coordinate::new("-1.89823", "2.49748", "0.00000"))
    );
    assert_eq!(
        dataset.datum(Category::FinalGeometry, &ExtractionKey::atom("0 P")).unwrap(),
        Datum::Coordinate(Coordinate::new("-1.97759", "2.94534", "0.09181"))
    );
    // "1 H" is absent while "11 H" exists
    assert_eq!(
        dataset.datum(Category::FinalGeometry, &ExtractionKey::atom("11 H")).unwrap(),
        Datum::Coordinate(Coordinate::new("-4.55745", "-0.05766", "-1.14911"))
    );
    assert!(dataset
        .datum(Category::FinalGeometry, &ExtractionKey::atom("1 H"))
        .unwrap()
        .is_absent());
}

#[test]
fn test_bond_lengths_use_final_geometry() {
    let dataset = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));

    assert_eq!(
        scalar(&dataset, Category::BondLengths, ExtractionKey::bond("0 P", "1 C")).as_deref(),
        Some("1.85902")
    );
    assert_eq!(
        scalar(&dataset, Category::BondLengths, ExtractionKey::bond("1 C", "0 P")).as_deref(),
        Some("1.85902")
    );
    assert_eq!(
        scalar(&dataset, Category::BondLengths, ExtractionKey::bond("20 H", "19 C")).as_deref(),
        Some("1.10156")
    );
    assert_eq!(
        scalar(&dataset, Category::BondLengths, ExtractionKey::bond("0 P", "5 S")),
        None
    );
}

#[test]
fn test_bond_angles_and_reversal() {
    let dataset = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));

    assert_angle(&dataset, ExtractionKey::angle("0 P", "1 C", "2 C"), 116.78352);
    assert_eq!(
        scalar(&dataset, Category::BondAngles, ExtractionKey::angle("0 P", "1 C", "2 C"))
            .as_deref(),
        Some("116.78352")
    );
    assert_angle(&dataset, ExtractionKey::angle("1 C", "2 C", "3 H"), 119.50841);
    assert_angle(&dataset, ExtractionKey::angle("3 H", "2 C", "1 C"), 119.50841);
    assert_angle(&dataset, ExtractionKey::angle("0 P", "3 H", "18 H"), 44.96164);

    // a different vertex is a different angle
    assert!(matches!(
        dataset.datum(Category::BondAngles, &ExtractionKey::angle("1 C", "0 P", "2 C")),
        Err(LookupError::KeyNotFound { .. })
    ));
}

#[test]
fn test_charges_come_from_last_population_analysis() {
    let dataset = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));

    assert_eq!(
        scalar(&dataset, Category::MullikenCharges, ExtractionKey::atom("0 P")).as_deref(),
        Some("0.303926")
    );
    assert_eq!(
        scalar(&dataset, Category::MullikenCharges, ExtractionKey::atom("11 H")).as_deref(),
        Some("-0.035902")
    );
    assert_eq!(
        scalar(&dataset, Category::MullikenCharges, ExtractionKey::atom("19 C")).as_deref(),
        Some("0.018554")
    );
    assert_eq!(scalar(&dataset, Category::MullikenCharges, ExtractionKey::atom("11 B")), None);
    assert_eq!(
        scalar(&dataset, Category::LoewdinCharges, ExtractionKey::atom("0 P")).as_deref(),
        Some("0.501961")
    );
    assert_eq!(
        scalar(&dataset, Category::LoewdinCharges, ExtractionKey::atom("11 H")).as_deref(),
        Some("-0.010041")
    );
}

#[test]
fn test_charge_sums_resolve_any_member_order() {
    let dataset = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));
    let six = ["19 C", "0 P", "3 H", "1 C", "2 C", "18 H"];

    assert_eq!(
        scalar(&dataset, Category::MullikenChargeSums, ExtractionKey::group(&["0 P", "3 H"]))
            .as_deref(),
        Some("0.30902")
    );
    assert_eq!(
        scalar(&dataset, Category::MullikenChargeSums, ExtractionKey::group(&six)).as_deref(),
        Some("0.17521")
    );
    assert_eq!(
        scalar(&dataset, Category::LoewdinChargeSums, ExtractionKey::group(&["3 H", "0 P"]))
            .as_deref(),
        Some("0.53324")
    );
    assert_eq!(
        scalar(&dataset, Category::LoewdinChargeSums, ExtractionKey::group(&six)).as_deref(),
        Some("0.29740")
    );
    assert_eq!(
        scalar(&dataset, Category::LoewdinChargeSums, ExtractionKey::group(&["1 H", "0 P"])),
        None
    );
}

#[test]
fn test_fixed_records() {
    let opt = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));

    let dipole: Vec<Option<String>> = ["X", "Y", "Z", "Tot"]
        .iter()
        .map(|f| scalar(&opt, Category::DipoleMoments, ExtractionKey::field(f)))
        .collect();
    assert_eq!(
        dipole,
        vec![
            Some("0.11095".to_string()),
            Some("-0.47210".to_string()),
            Some("0.13978".to_string()),
            Some("0.50470".to_string()),
        ]
    );

    // last of three orbital energy tables
    assert_eq!(
        scalar(&opt, Category::HomoLumoEnergies, ExtractionKey::field("HOMO energy")).as_deref(),
        Some("-5.2494")
    );
    assert_eq!(
        scalar(&opt, Category::HomoLumoEnergies, ExtractionKey::field("LUMO energy")).as_deref(),
        Some("-1.6248")
    );

    // no polarizability calculation in the optimisation run
    let polarizability = opt.category_data(Category::Polarizability).unwrap();
    assert_eq!(polarizability.len(), 10);
    assert!(polarizability.iter().all(|(_, datum)| datum.is_absent()));
}

#[test]
fn test_polarizability_tensor() {
    let sp = StructureDataset::build(&document("pph3_sp.out"), &manifest("pph3_inputs.txt"));

    let expected = [
        ("alpha_xx", "236.30256"),
        ("alpha_xy", "-1.24521"),
        ("alpha_xz", "3.45120"),
        ("alpha_yx", "-1.24531"),
        ("alpha_yy", "210.57891"),
        ("alpha_yz", "-2.11034"),
        ("alpha_zx", "3.45140"),
        ("alpha_zy", "-2.11020"),
        ("alpha_zz", "202.02390"),
        ("alpha", "216.30179"),
    ];
    for (field, value) in expected {
        assert_eq!(
            scalar(&sp, Category::Polarizability, ExtractionKey::field(field)).as_deref(),
            Some(value),
            "{}",
            field
        );
    }
}

#[test]
fn test_single_point_with_text_manifest() {
    let sp = StructureDataset::build(&document("pph3_sp.out"), &manifest("pph3_inputs.txt"));

    // only one geometry block, so initial and final agree
    let initial = sp.datum(Category::InitialGeometry, &ExtractionKey::atom("0 P")).unwrap();
    let last = sp.datum(Category::FinalGeometry, &ExtractionKey::atom("0 P")).unwrap();
    assert_eq!(initial, last);
    assert_eq!(
        initial,
        Datum::Coordinate(Coordinate::new("-1.97759", "2.94534", "0.09181"))
    );

    assert_eq!(
        scalar(&sp, Category::BondLengths, ExtractionKey::bond("2 C", "1 C")).as_deref(),
        Some("1.41487")
    );
    assert_angle(&sp, ExtractionKey::angle("2 C", "1 C", "0 P"), 116.78352);
    assert_eq!(
        scalar(&sp, Category::MullikenCharges, ExtractionKey::atom("19 C")).as_deref(),
        Some("0.019255")
    );
    assert_eq!(
        scalar(&sp, Category::LoewdinCharges, ExtractionKey::atom("19 C")).as_deref(),
        Some("-0.027309")
    );
    let six = ["0 P", "1 C", "18 H", "19 C", "2 C", "3 H"];
    assert_eq!(
        scalar(&sp, Category::MullikenChargeSums, ExtractionKey::group(&six)).as_deref(),
        Some("0.21780")
    );
    assert_eq!(
        scalar(&sp, Category::LoewdinChargeSums, ExtractionKey::group(&six)).as_deref(),
        Some("0.33866")
    );
    assert_eq!(
        scalar(&sp, Category::HomoLumoEnergies, ExtractionKey::field("HOMO energy")).as_deref(),
        Some("-5.8242")
    );
    assert_eq!(
        scalar(&sp, Category::HomoLumoEnergies, ExtractionKey::field("LUMO energy")).as_deref(),
        Some("-0.7180")
    );
    assert!(sp.diagnostics().is_empty());
}

#[test]
fn test_diagnostics_name_every_absent_value() {
    let dataset = StructureDataset::build(&document("pph3_opt.out"), &manifest("pph3_inputs.json"));
    let diagnostics = dataset.diagnostics();

    assert_eq!(diagnostics.len(), 14);
    assert!(diagnostics.iter().all(|d| d.document == "pph3_opt.out"));
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| {
                d.category == Category::Polarizability && d.reason == Reason::SectionNotFound
            })
            .count(),
        10
    );
    assert!(diagnostics.iter().any(|d| d.category == Category::FinalGeometry
        && d.key == ExtractionKey::atom("1 H")
        && d.reason == Reason::RecordNotFound));
    assert!(diagnostics.iter().any(|d| d.category == Category::BondLengths
        && d.reason
            == Reason::MissingDependency {
                atom: AtomLabel::new("5 S")
            }));
    assert!(diagnostics.iter().any(|d| d.category == Category::LoewdinChargeSums
        && d.reason
            == Reason::MissingDependency {
                atom: AtomLabel::new("1 H")
            }));
}

#[test]
fn test_skipped_categories_and_lookup_errors() {
    let dataset = StructureDataset::build(&document("pph3_sp.out"), &manifest("pph3_skip.json"));

    let present: Vec<Category> = dataset.categories().iter().map(|c| c.category()).collect();
    assert_eq!(
        present,
        vec![
            Category::FinalGeometry,
            Category::Polarizability,
            Category::DipoleMoments,
            Category::HomoLumoEnergies,
            Category::LoewdinCharges,
        ]
    );
    assert!(matches!(
        dataset.category(Category::BondLengths),
        Err(LookupError::CategoryNotFound { .. })
    ));
    assert!(matches!(
        dataset.datum(Category::LoewdinCharges, &ExtractionKey::atom("0 P")),
        Err(LookupError::KeyNotFound { .. })
    ));

    // lookups hand out copies
    let mut copy = dataset.category_data(Category::LoewdinCharges).unwrap();
    copy.clear();
    assert_eq!(dataset.category_data(Category::LoewdinCharges).unwrap().len(), 1);
}
