//! Built-in help for the odx command line
//!
//! Documents the commands, the manifest fields and the fixed record
//! categories every dataset carries.

use crate::category::Category;

/// Documentation entry for a single manifest field.
#[derive(Debug, Clone)]
pub struct ManifestField {
    /// Category filled from this field.
    pub category: Category,
    /// Shape of one entry (e.g. "atom label", "pair of labels").
    pub entry: &'static str,
    /// A brief description of what gets extracted.
    pub description: &'static str,
    /// An example JSON value.
    pub example: &'static str,
}

/// Returns documentation for every manifest field, in dataset order.
pub fn get_manifest_fields() -> &'static [ManifestField] {
    &[
        ManifestField {
            category: Category::InitialGeometry,
            entry: "atom label",
            description: "Coordinates (Angstrom) from the first Cartesian (A.U.) table",
            example: r#"["0 P", "1 C"]"#,
        },
        ManifestField {
            category: Category::FinalGeometry,
            entry: "atom label",
            description: "Coordinates (Angstrom) from the last Cartesian (A.U.) table",
            example: r#"["0 P", "1 C"]"#,
        },
        ManifestField {
            category: Category::BondLengths,
            entry: "pair of labels",
            description: "Distance (Angstrom) in the final geometry; pairs are order-insensitive",
            example: r#"[["0 P", "1 C"], ["19 C", "20 H"]]"#,
        },
        ManifestField {
            category: Category::BondAngles,
            entry: "triple of labels",
            description: "Angle (degrees) at the middle atom in the final geometry",
            example: r#"[["0 P", "1 C", "2 C"]]"#,
        },
        ManifestField {
            category: Category::MullikenCharges,
            entry: "atom label",
            description: "Mulliken charge from the last population analysis",
            example: r#"["0 P"]"#,
        },
        ManifestField {
            category: Category::MullikenChargeSums,
            entry: "list of labels",
            description: "Sum of Mulliken charges over the group",
            example: r#"[["0 P", "3 H"]]"#,
        },
        ManifestField {
            category: Category::LoewdinCharges,
            entry: "atom label",
            description: "Loewdin charge from the last population analysis",
            example: r#"["0 P"]"#,
        },
        ManifestField {
            category: Category::LoewdinChargeSums,
            entry: "list of labels",
            description: "Sum of Loewdin charges over the group",
            example: r#"[["0 P", "3 H"]]"#,
        },
    ]
}

/// Prints the global help message.
pub fn print_global_help() {
    println!("odx - ORCA output data extraction");
    println!();
    println!("USAGE:");
    println!("    odx [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    <manifest> [output_name] [--format csv|json|xlsx] [--dir <directory>]");
    println!("                        Extract the manifest's data from every ORCA output file");
    println!("                        in the directory (default: current directory)");
    println!("                        Default output name: <prefix>_<manifest stem>");
    println!();
    println!("    ci <orca_output> [manifest_file]");
    println!("                        Create a JSON manifest listing every atom of the report");
    println!();
    println!("    ci odx_config.cfg");
    println!("                        Create a configuration template file");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help [topic]   Show help. Topics: manifest, examples");
    println!();
    println!("CONFIGURATION FILE:");
    println!("    odx uses 'odx_config.cfg' for program configuration.");
    println!("    Create template:     odx ci odx_config.cfg");
    println!("    Supported locations:");
    println!("      - ./odx_config.cfg (local, highest priority)");
    println!("      - ~/.config/odx/odx_config.cfg (user)");
    println!("      - /etc/odx/odx_config.cfg (system)");
    println!("    Features: report extension, output format and prefix, logging");
    println!();
    println!("EXAMPLES:");
    println!("    Create manifest:     odx ci pph3_opt.out");
    println!("    Extract to CSV:      odx pph3_opt_manifest.json");
    println!("    Extract to JSON:     odx pph3_opt_manifest.json results --format json");
    println!("    Extract to Excel:    odx pph3_opt_manifest.json results --format xlsx");
    println!("    View fields:         odx --help manifest");
    println!();
}

/// Prints help for the `ci` command.
pub fn print_ci_help() {
    println!("Create Template (ci) Command");
    println!("═════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    odx ci <orca_output> [manifest_file]");
    println!("    odx ci odx_config.cfg");
    println!();
    println!("DESCRIPTION:");
    println!("    Generates a JSON manifest from an ORCA output file. Every atom of the");
    println!("    first Cartesian (A.U.) table is listed for the geometry and charge");
    println!("    fields; bond, angle and charge-sum lists are left empty.");
    println!();
    println!("    With 'odx_config.cfg' as the argument, writes a configuration");
    println!("    template with every option at its default instead.");
    println!();
    println!("ARGUMENTS:");
    println!("    <orca_output>        ORCA output file (required)");
    println!();
    println!("    [manifest_file]      Output manifest file (optional)");
    println!("                        Default: <report_stem>_manifest.json");
    println!();
}

/// Prints documentation for every manifest field and the fixed records.
pub fn print_manifest_help() {
    println!("Manifest Fields");
    println!("═══════════════");
    println!();
    println!("A manifest is a JSON object; a missing or empty field skips its category.");
    println!("Atom labels are written as in the ORCA tables: index, space, element.");
    println!();
    for field in get_manifest_fields() {
        println!(
            "  {} ({})",
            field.category.manifest_field().unwrap_or_default(),
            field.category
        );
        println!("    Entry:       {}", field.entry);
        println!("    Extracts:    {}", field.description);
        println!("    Example:     {}", field.example);
        println!();
    }

    println!("Fixed records (always extracted, no manifest field):");
    for category in Category::ALL.iter().filter(|c| !c.takes_inputs()) {
        println!("  {:<20} {}", category.name(), category.fixed_fields().join(", "));
    }
    println!();
    println!("The older line-oriented text manifest is also accepted: the fields above,");
    println!("in that order, on 0-based lines 4, 7, 10, 13, 16, 19, 22 and 25.");
    println!();
}

/// Prints usage examples.
pub fn print_examples() {
    println!("Usage Examples");
    println!("══════════════");
    println!();
    println!("1. Build a manifest from an optimisation output, then trim it:");
    println!("   odx ci pph3_opt.out");
    println!("   # edit pph3_opt_manifest.json, add bonds and angles");
    println!();
    println!("2. Extract every .out file in the current directory:");
    println!("   odx pph3_opt_manifest.json");
    println!("   # writes ORCA_data_pph3_opt_manifest.csv");
    println!();
    println!("3. Extract a different directory to JSON with a custom name:");
    println!("   odx pph3_opt_manifest.json results/pph3 --format json --dir runs/");
    println!("   # writes results/pph3.json");
    println!();
    println!("4. Show every extracted value:");
    println!("   RUST_LOG=debug odx pph3_opt_manifest.json");
    println!();
}
