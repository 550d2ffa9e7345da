//! Configuration management for odx.
//!
//! Settings live in INI-format files and are loaded hierarchically with the
//! following precedence:
//!
//! 1. Local configuration (`./odx_config.cfg`)
//! 2. User configuration (`~/.config/odx/odx_config.cfg`)
//! 3. System configuration (`/etc/odx/odx_config.cfg`)
//! 4. Built-in defaults
//!
//! # Configuration File Format
//!
//! ```ini
//! [extensions]
//! orca = out
//!
//! [output]
//! format = csv
//! prefix = ORCA_data
//!
//! [logging]
//! level = info
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use odx::settings::SettingsManager;
//!
//! let settings = SettingsManager::load()?;
//! println!("ORCA output extension: {}", settings.extensions().orca);
//! # Ok::<(), odx::settings::ConfigError>(())
//! ```

use crate::export::ExportFormat;
use configparser::ini::Ini;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file at every level.
pub const CONFIG_FILE_NAME: &str = "odx_config.cfg";

/// Errors that can occur during configuration loading and processing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error when reading configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// INI parsing error
    #[error("INI parsing error: {0}")]
    IniParse(String),
    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

type Section = HashMap<String, Option<String>>;

/// Main configuration structure containing all program settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Report file extensions
    pub extensions: ExtensionSettings,
    /// Output file settings
    pub output: OutputSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// File extension settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionSettings {
    /// ORCA output file extension picked up by batch runs (default: "out")
    pub orca: String,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            orca: "out".to_string(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Default export format (default: csv)
    pub format: ExportFormat,
    /// Prefix of default output names (default: "ORCA_data")
    pub prefix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            prefix: "ORCA_data".to_string(),
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log level (default: "info")
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Configuration manager that handles loading and accessing program settings.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings: Settings,
    config_source: String,
}

impl SettingsManager {
    /// Loads configuration from available configuration files.
    ///
    /// Searches for configuration files in the following order:
    /// 1. `./odx_config.cfg` (current working directory)
    /// 2. `~/.config/odx/odx_config.cfg` (user configuration)
    /// 3. `/etc/odx/odx_config.cfg` (system configuration)
    /// 4. Built-in defaults (fallback)
    ///
    /// A file that fails to parse is reported with `warn!` and skipped.
    pub fn load() -> Result<Self, ConfigError> {
        let candidates = [
            ("system", Self::get_system_config_path()),
            ("user", Self::get_user_config_path()),
            ("local", Some(PathBuf::from(CONFIG_FILE_NAME))),
        ];
        let (settings, source) = Self::load_from_files(&candidates);
        info!("Configuration loaded from: {}", source);
        Ok(Self {
            settings,
            config_source: source,
        })
    }

    /// Loads a single configuration file on top of the built-in defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::load_config(path)?;
        Ok(Self {
            settings,
            config_source: format!("file ({})", path.display()),
        })
    }

    /// Returns the source of the loaded configuration.
    pub fn config_source(&self) -> &str {
        &self.config_source
    }

    /// Gets a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gets the extension settings.
    pub fn extensions(&self) -> &ExtensionSettings {
        &self.settings.extensions
    }

    /// Gets the output settings.
    pub fn output(&self) -> &OutputSettings {
        &self.settings.output
    }

    /// Gets the logging settings.
    pub fn logging(&self) -> &LoggingSettings {
        &self.settings.logging
    }

    /// Applies every existing file in `candidates`, later entries overriding earlier ones.
    fn load_from_files(candidates: &[(&str, Option<PathBuf>)]) -> (Settings, String) {
        let mut settings = Settings::default();
        let mut config_source = "built-in defaults".to_string();

        for (level, path) in candidates {
            let Some(path) = path else { continue };
            if !path.exists() {
                continue;
            }
            match Self::read_sections(path) {
                Ok(sections) => match settings.apply(&sections) {
                    Ok(()) => {
                        config_source = format!("{} config ({})", level, path.display());
                        debug!("Loaded {} configuration from: {}", level, path.display());
                    }
                    Err(e) => warn!("Invalid {} config in {}: {}", level, path.display(), e),
                },
                Err(e) => {
                    warn!(
                        "Failed to load {} config from {}: {}",
                        level,
                        path.display(),
                        e
                    );
                }
            }
        }

        (settings, config_source)
    }

    /// Loads configuration from a single INI file over the defaults.
    fn load_config(path: &Path) -> Result<Settings, ConfigError> {
        let sections = Self::read_sections(path)?;
        let mut settings = Settings::default();
        settings.apply(&sections)?;
        Ok(settings)
    }

    fn read_sections(path: &Path) -> Result<HashMap<String, Section>, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut ini = Ini::new();
        ini.read(content)
            .map_err(|e| ConfigError::IniParse(format!("Failed to parse INI: {}", e)))?;
        Ok(ini.get_map_ref().clone())
    }

    /// Gets the system configuration file path.
    fn get_system_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            Some(PathBuf::from("/etc/odx").join(CONFIG_FILE_NAME))
        }
        #[cfg(windows)]
        {
            std::env::var("PROGRAMDATA")
                .ok()
                .map(|pd| PathBuf::from(pd).join("odx").join(CONFIG_FILE_NAME))
        }
    }

    /// Gets the user configuration file path.
    fn get_user_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("odx")
                    .join(CONFIG_FILE_NAME)
            })
        }
        #[cfg(windows)]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|appdata| PathBuf::from(appdata).join("odx").join(CONFIG_FILE_NAME))
        }
    }

    /// Creates a default odx_config.cfg file with every option and its default.
    pub fn create_template(path: &Path) -> Result<(), ConfigError> {
        fs::write(path, Self::generate_template_content())?;
        info!("Created settings template at: {}", path.display());
        Ok(())
    }

    /// Generates the content for an odx_config.cfg template file.
    fn generate_template_content() -> String {
        format!(
            r#"# odx Configuration File
#
# Configuration files are loaded in hierarchical order with local settings taking precedence:
#
# 1. Current working directory (./odx_config.cfg) - highest priority
# 2. User config directory
#    (~/.config/odx/odx_config.cfg on Unix, %APPDATA%/odx/odx_config.cfg on Windows)
# 3. System config directory
#    (/etc/odx/odx_config.cfg on Unix, %PROGRAMDATA%/odx/odx_config.cfg on Windows)
# 4. Built-in defaults (fallback)
#
# Any missing sections or values use the built-in defaults shown below.

[extensions]
# Extension of ORCA output files picked up when processing a directory (default: out)
orca = {}

[output]
# Default export format: csv, json or xlsx (default: csv)
format = {}

# Prefix of the default output name, <prefix>_<manifest name> (default: ORCA_data)
prefix = {}

[logging]
# Log level: debug, info, warn, error (default: info)
# - debug: every extracted value
# - info: one line per processed report
# - warn: values that could not be extracted
# - error: unreadable reports only
# RUST_LOG overrides this setting.
level = {}
"#,
            ExtensionSettings::default().orca,
            OutputSettings::default().format,
            OutputSettings::default().prefix,
            LoggingSettings::default().level,
        )
    }
}

impl Settings {
    /// Overrides the values present in `sections`, leaving the others untouched.
    fn apply(&mut self, sections: &HashMap<String, Section>) -> Result<(), ConfigError> {
        if let Some(extensions) = sections.get("extensions") {
            if let Some(Some(orca)) = extensions.get("orca") {
                if !orca.is_empty() {
                    self.extensions.orca = orca.trim_start_matches('.').to_string();
                }
            }
        }

        if let Some(output) = sections.get("output") {
            if let Some(Some(format)) = output.get("format") {
                self.output.format = format
                    .parse()
                    .map_err(|e: String| ConfigError::InvalidValue(e))?;
            }
            if let Some(Some(prefix)) = output.get("prefix") {
                self.output.prefix = prefix.clone();
            }
        }

        if let Some(logging) = sections.get("logging") {
            if let Some(Some(level)) = logging.get("level") {
                if level.parse::<log::LevelFilter>().is_err() {
                    return Err(ConfigError::InvalidValue(format!(
                        "Invalid log level: {}",
                        level
                    )));
                }
                self.logging.level = level.clone();
            }
        }

        Ok(())
    }
}
