//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.encyclopedia.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".encyclopedia.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input/output layout.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Document metadata.
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log at debug level unless `--quiet` is given.
    #[serde(default)]
    pub verbose: bool,

    /// Skip hierarchy files that fail to parse instead of aborting.
    #[serde(default)]
    pub skip_malformed: bool,
}

/// Where hierarchy files are read from and the document is written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Directory holding the `partNN` subdirectories.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Number of parts, numbered from 1.
    #[serde(default = "default_part_count")]
    pub part_count: u32,

    /// Hierarchy file name inside each part directory.
    #[serde(default = "default_hierarchy_file")]
    pub hierarchy_file: String,

    /// Output file, resolved against `base_dir`.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            part_count: default_part_count(),
            hierarchy_file: default_hierarchy_file(),
            output_file: default_output_file(),
        }
    }
}

impl LayoutConfig {
    /// Full path of the consolidated document.
    pub fn output_path(&self) -> PathBuf {
        self.base_dir.join(&self.output_file)
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_part_count() -> u32 {
    16
}

fn default_hierarchy_file() -> String {
    "slide_hierarchy.json".to_string()
}

fn default_output_file() -> PathBuf {
    PathBuf::from("encyclopedia_complete.json")
}

/// Values copied into the document's metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            source: default_source(),
        }
    }
}

fn default_title() -> String {
    "The Brooks Encyclopedia of Chart Patterns".to_string()
}

fn default_version() -> String {
    "October 1, 2025".to_string()
}

fn default_source() -> String {
    "Slide Hierarchy (Complete)".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_dir) = args.base_dir {
            self.layout.base_dir = base_dir.clone();
        }
        if let Some(ref output) = args.output {
            self.layout.output_file = output.clone();
        }
        if let Some(parts) = args.parts {
            self.layout.part_count = parts;
        }
        if let Some(ref name) = args.hierarchy_file {
            self.layout.hierarchy_file = name.clone();
        }

        // Flags only ever switch behavior on
        if args.verbose {
            self.general.verbose = true;
        }
        if args.skip_malformed {
            self.general.skip_malformed = true;
        }
    }

    /// Log level for the run. `--quiet` wins over any verbose setting.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default config")
    }
}
