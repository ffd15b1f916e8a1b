//! Encyclopedia Aggregator - consolidate slide hierarchies
//!
//! A CLI tool that reads the per-part `slide_hierarchy.json` files of the
//! encyclopedia and writes one document with section and slide counts.
//!
//! Exit codes:
//!   0 - Success (missing parts are warnings, not failures)
//!   1 - Runtime error (malformed input, unwritable output, bad config, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use analysis::Aggregator;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Config decides the log level, so it is read before logging starts
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("Encyclopedia Aggregator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    if let Err(e) = run(&args, &config) {
        error!("Aggregation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .encyclopedia.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the base directory, part count and metadata.");
    Ok(())
}

/// Initialize logging at the configured level.
///
/// `RUST_LOG` overrides the level chosen by flags and config.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the aggregation workflow.
fn run(args: &Args, config: &Config) -> Result<()> {
    debug!("Effective config: {:?}", config);

    if args.dry_run {
        handle_dry_run(config);
        return Ok(());
    }

    let aggregator = Aggregator::new(config).with_progress(!args.quiet);
    let document = aggregator.generate()?;

    if let Some(ref markdown_path) = args.markdown {
        report::write_markdown_summary(&document, markdown_path)?;
        if !args.quiet {
            println!("📝 Markdown summary: {}", markdown_path.display());
        }
    }

    Ok(())
}

/// Handle --dry-run: report which hierarchy files exist, write nothing.
fn handle_dry_run(config: &Config) {
    let loader = loader::HierarchyLoader::new(config.layout.clone());
    let files = loader.scan();
    let present = files.iter().filter(|f| f.size.is_some()).count();

    println!(
        "\n🔍 Dry run: checking hierarchy files under {}\n",
        config.layout.base_dir.display()
    );

    for file in &files {
        match file.size {
            Some(size) => println!(
                "   📄 Part {:>2}: {} ({} bytes)",
                file.part_num,
                file.path.display(),
                size
            ),
            None => println!(
                "   ⚠️  Part {:>2}: {} (missing)",
                file.part_num,
                file.path.display()
            ),
        }
    }

    println!("\n   Found {} of {} hierarchy files", present, files.len());
    println!(
        "   Output would be written to: {}",
        config.layout.output_path().display()
    );
    println!("\n✅ Dry run complete. Nothing was written.");
}

/// Where the configuration came from, logged once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    /// The default file exists but could not be loaded.
    Fallback(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(e))),
    }
}
