use odx::batch::run_batch;
use odx::export::{export, ExportFormat};
use odx::manifest::Manifest;
use odx::naming::OutputNaming;
use odx::settings::{SettingsManager, CONFIG_FILE_NAME};
use odx::template_generator::{
    generate_manifest_template, get_default_output_path, write_template_to_file,
};
use log::{info, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

/// Options of the extraction command.
#[derive(Debug)]
struct ExtractArgs {
    manifest: PathBuf,
    output_name: Option<PathBuf>,
    format: Option<ExportFormat>,
    directory: PathBuf,
}

/// Main entry point for odx.
///
/// Commands:
/// - `odx <manifest> [output_name] [--format csv|json|xlsx] [--dir <directory>]`: Extract data
/// - `odx ci <orca_output> [manifest_file]`: Create a manifest template
/// - `odx ci odx_config.cfg`: Create a settings template
/// - `odx --help [topic]`: Display help information
fn main() {
    let settings = match SettingsManager::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::new()
        .filter_level(settings.logging().level_filter())
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format_timestamp_millis()
        .init();
    info!("Configuration: {}", settings.config_source());

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    check_help_flags(&args);

    let command = &args[1];

    match command.as_str() {
        "ci" => {
            if args.len() < 3 {
                eprintln!("Error: Missing file argument");
                eprintln!("Usage:");
                eprintln!(
                    "  {} ci <orca_output> [manifest_file]  - Create manifest template",
                    args[0]
                );
                eprintln!(
                    "  {} ci {}               - Create settings template",
                    args[0], CONFIG_FILE_NAME
                );
                process::exit(1);
            }

            let file_arg = &args[2];

            if file_arg == CONFIG_FILE_NAME {
                match run_create_settings_template() {
                    Ok(()) => {
                        println!("✓ Settings template created successfully!");
                        println!("  Output file: {}", CONFIG_FILE_NAME);
                        println!("\nNext steps:");
                        println!("  1. Review and edit the {} file", CONFIG_FILE_NAME);
                        println!("  2. The settings will be automatically loaded by odx");
                    }
                    Err(e) => {
                        eprintln!("Error creating settings template: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                let report_path = Path::new(file_arg);
                let output_path = args.get(3).map(Path::new);

                match run_create_manifest(report_path, output_path) {
                    Ok(output_file) => {
                        println!("✓ Manifest template created successfully!");
                        println!("  Output file: {}", output_file.display());
                        println!("\nNext steps:");
                        println!("  1. Remove the atoms you do not need");
                        println!("  2. Add bond, angle and charge-sum entries");
                        println!("  3. Run odx: {} {}", args[0], output_file.display());
                    }
                    Err(e) => {
                        eprintln!("Error creating manifest: {}", e);
                        process::exit(1);
                    }
                }
            }
        }
        _ => {
            if command.starts_with('-') {
                eprintln!("Error: Unknown command: {}", command);
                print_usage(&args[0]);
                process::exit(1);
            }

            let extract_args = match parse_extract_args(&args[1..]) {
                Ok(extract_args) => extract_args,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    print_usage(&args[0]);
                    process::exit(1);
                }
            };

            match run_extraction(&extract_args, &settings) {
                Ok(path) => println!("✓ Results written to {}", path.display()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}

/// Check for help flags and print appropriate help
fn check_help_flags(args: &[String]) {
    use odx::help::*;

    if args.len() >= 3 && (args[1] == "--help" || args[1] == "-h") {
        match args[2].as_str() {
            "manifest" => print_manifest_help(),
            "examples" => print_examples(),
            "ci" => print_ci_help(),
            _ => print_global_help(),
        }
        process::exit(0);
    }

    if args.len() == 2 && (args[1] == "--help" || args[1] == "-h") {
        print_global_help();
        process::exit(0);
    }

    if args.len() >= 3 && args[1] == "ci" && (args[2] == "--help" || args[2] == "-h") {
        print_ci_help();
        process::exit(0);
    }

    if args.len() >= 3
        && !args[1].starts_with('-')
        && args[2..].iter().any(|a| a == "--help" || a == "-h")
    {
        print_manifest_help();
        process::exit(0);
    }
}

/// Prints usage information to stderr.
fn print_usage(program_name: &str) {
    eprintln!("odx - ORCA output data extraction");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  {} <manifest> [output_name] [--format csv|json|xlsx] [--dir <directory>]",
        program_name
    );
    eprintln!("                    Extract data from every ORCA output file in a directory");
    eprintln!();
    eprintln!("  {} ci <orca_output> [manifest_file]", program_name);
    eprintln!("                    Create a JSON manifest template from an ORCA output file");
    eprintln!();
    eprintln!("  {} ci {}", program_name, CONFIG_FILE_NAME);
    eprintln!("                    Create a settings template file for configuration");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} ci pph3_opt.out", program_name);
    eprintln!("  {} pph3_opt_manifest.json", program_name);
    eprintln!("  {} pph3_opt_manifest.json results --format json", program_name);
}

/// Parses `<manifest> [output_name] [--format csv|json|xlsx] [--dir <directory>]`.
fn parse_extract_args(args: &[String]) -> Result<ExtractArgs, String> {
    let mut positional = Vec::new();
    let mut format = None;
    let mut directory = PathBuf::from(".");

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                let value = iter.next().ok_or("--format requires a value")?;
                format = Some(value.parse::<ExportFormat>()?);
            }
            "--dir" | "-d" => {
                let value = iter.next().ok_or("--dir requires a value")?;
                directory = PathBuf::from(value);
            }
            other if other.starts_with('-') => return Err(format!("Unknown option: {}", other)),
            other => positional.push(PathBuf::from(other)),
        }
    }

    let mut positional = positional.into_iter();
    let manifest = positional.next().ok_or("Missing manifest argument")?;
    let output_name = positional.next();
    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra.display()));
    }

    Ok(ExtractArgs {
        manifest,
        output_name,
        format,
        directory,
    })
}

/// Loads the manifest, processes every report in the directory and writes the results.
fn run_extraction(
    args: &ExtractArgs,
    settings: &SettingsManager,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let manifest = Manifest::load(&args.manifest)?;
    let format = args.format.unwrap_or(settings.output().format);
    let output_name = args.output_name.clone().unwrap_or_else(|| {
        PathBuf::from(OutputNaming::new(&args.manifest, &settings.output().prefix).output_name())
    });

    info!(
        "Extracting {} from .{} files in {}",
        manifest.name(),
        settings.extensions().orca,
        args.directory.display()
    );
    let outcome = run_batch(&args.directory, &manifest, &settings.extensions().orca)?;

    if outcome.datasets.is_empty() {
        return Err(format!(
            "No readable .{} files in {}",
            settings.extensions().orca,
            args.directory.display()
        )
        .into());
    }

    let missing: usize = outcome.datasets.iter().map(|d| d.diagnostics().len()).sum();
    if missing > 0 {
        warn!("{} value(s) could not be extracted and are left empty", missing);
    }
    for (path, e) in &outcome.failures {
        warn!("Not included: {} ({})", path.display(), e);
    }

    Ok(export(&outcome.datasets, &output_name, format)?)
}

/// Creates a manifest template from an ORCA output file.
fn run_create_manifest(
    report_file: &Path,
    output_path: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let template = generate_manifest_template(report_file)?;
    let output_file = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| get_default_output_path(report_file));

    if output_file.exists() {
        return Err(format!(
            "{} already exists. Please remove it first or choose a different name.",
            output_file.display()
        )
        .into());
    }

    write_template_to_file(&template, &output_file)?;
    Ok(output_file)
}

/// Creates odx_config.cfg in the current directory.
fn run_create_settings_template() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = Path::new(CONFIG_FILE_NAME);

    if settings_path.exists() {
        return Err(format!(
            "{} already exists. Please remove it first or choose a different location.",
            CONFIG_FILE_NAME
        )
        .into());
    }

    SettingsManager::create_template(settings_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_extract_args() {
        let args = parse_extract_args(&strings(&[
            "m.json", "out/res", "--format", "json", "--dir", "runs",
        ]))
        .unwrap();
        assert_eq!(args.manifest, PathBuf::from("m.json"));
        assert_eq!(args.output_name, Some(PathBuf::from("out/res")));
        assert_eq!(args.format, Some(ExportFormat::Json));
        assert_eq!(args.directory, PathBuf::from("runs"));

        let args = parse_extract_args(&strings(&["m.json", "--format", "xlsx"])).unwrap();
        assert_eq!(args.format, Some(ExportFormat::Xlsx));

        let args = parse_extract_args(&strings(&["m.json"])).unwrap();
        assert_eq!(args.output_name, None);
        assert_eq!(args.format, None);
        assert_eq!(args.directory, PathBuf::from("."));
    }

    #[test]
    fn test_parse_extract_args_errors() {
        assert!(parse_extract_args(&strings(&["m.json", "--format", "xml"])).is_err());
        assert!(parse_extract_args(&strings(&["m.json", "--dir"])).is_err());
        assert!(parse_extract_args(&strings(&["m.json", "a", "b"])).is_err());
        assert!(parse_extract_args(&strings(&["m.json", "--verbose"])).is_err());
    }
}
