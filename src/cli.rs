//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Encyclopedia Aggregator - consolidate per-part slide hierarchies
///
/// Reads `partNN/slide_hierarchy.json` for every part under the base
/// directory and writes `encyclopedia_complete.json` with section and
/// slide counts. Missing parts are reported and counted as empty.
///
/// Examples:
///   encyclopedia-aggregator
///   encyclopedia-aggregator --base-dir ./brooks_encyclopedia
///   encyclopedia-aggregator --markdown summary.md
///   encyclopedia-aggregator --dry-run
///   encyclopedia-aggregator --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing the part01..partNN subdirectories
    ///
    /// Defaults to the current directory or the config file setting.
    #[arg(short = 'd', long, value_name = "DIR", env = "ENCYCLOPEDIA_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Output file for the consolidated document
    ///
    /// Relative paths are resolved against the base directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of parts to aggregate
    #[arg(long, value_name = "COUNT")]
    pub parts: Option<u32>,

    /// Hierarchy file name inside each part directory
    #[arg(long, value_name = "NAME")]
    pub hierarchy_file: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .encyclopedia.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip hierarchy files that cannot be parsed instead of failing
    #[arg(long)]
    pub skip_malformed: bool,

    /// Also write a Markdown summary report to this file
    #[arg(long, value_name = "FILE")]
    pub markdown: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: report which hierarchy files exist without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .encyclopedia.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.parts == Some(0) {
            return Err("Part count must be at least 1".to_string());
        }

        if let Some(ref name) = self.hierarchy_file {
            if name.is_empty() {
                return Err("Hierarchy file name cannot be empty".to_string());
            }
        }

        if let Some(ref base_dir) = self.base_dir {
            if !base_dir.exists() {
                return Err(format!(
                    "Base directory does not exist: {}",
                    base_dir.display()
                ));
            }
            if !base_dir.is_dir() {
                return Err(format!(
                    "Base path is not a directory: {}",
                    base_dir.display()
                ));
            }
        }

        Ok(())
    }
}
