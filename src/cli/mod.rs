//! Command-line interface for nsrl-extract
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - Mode selection (headless export vs interactive form)
//! - Utility subcommands (version, completion, config)

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::AppInfo;
use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::export::{ExportOptions, ExportRequest, ExportSummary, create_output, export};
use crate::reader::ColumnQuery;

pub mod completion;

/// Extract one field of an NSRL RDSv3 database into a hash list
#[derive(Parser, Debug)]
#[command(
    name = "nsrl-extract",
    version,
    about = "Little helper to get hashes for X-Ways",
    long_about = "Reads one field of one table of an NSRL RDSv3 (SQLite) database and writes
the values to a text file, one per line, after a header line holding the
upper-cased field name.

Run with -o FILE and a database path for a headless export, or with
--interactive for a terminal form.",
    subcommand_negates_reqs = true
)]
pub struct CliArgs {
    /// Output file to write hash list
    #[arg(
        short = 'o',
        long = "out",
        value_name = "FILE",
        required_unless_present = "interactive"
    )]
    pub out: Option<PathBuf>,

    /// Table of database to read (default: FILE)
    #[arg(short = 't', long, value_name = "STRING")]
    pub table: Option<String>,

    /// Field of database to read (default: md5)
    #[arg(short = 'f', long, value_name = "STRING")]
    pub field: Option<String>,

    /// Database/SQLite file to read
    #[arg(value_name = "DB_FILE", required_unless_present = "interactive")]
    pub db: Option<PathBuf>,

    /// Fill in table, field and files in a terminal form
    #[arg(short = 'i', long, conflicts_with_all = ["out", "db"])]
    pub interactive: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Count rows first so the progress bar shows a total
    #[arg(long = "count", conflicts_with = "no_progress")]
    pub count: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for nsrl-extract
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// How the process was asked to run, decided once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Export straight from the command line
    Headless { db: PathBuf, out: PathBuf },
    /// Terminal form
    Interactive,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,

    /// Build metadata
    info: AppInfo,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new(info: AppInfo) -> Result<Self> {
        Self::from_args(CliArgs::parse(), info)
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs, info: AppInfo) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config, info })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);

        Ok(config)
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_query_args(config, args);
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
    }

    /// Apply table/field arguments to configuration
    fn apply_query_args(config: &mut Config, args: &CliArgs) {
        if let Some(table) = &args.table {
            config.defaults.table = table.clone();
        }
        if let Some(field) = &args.field {
            config.defaults.field = field.clone();
        }
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_progress || args.quiet {
            config.display.progress = false;
        }

        if args.count {
            config.display.count_rows = true;
        }

        if args.no_color {
            config.display.color_output = false;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Get the build metadata
    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    /// Run mode selected by the arguments
    pub fn mode(&self) -> Mode {
        match (&self.args.db, &self.args.out) {
            (Some(db), Some(out)) if !self.args.interactive => Mode::Headless {
                db: db.clone(),
                out: out.clone(),
            },
            _ => Mode::Interactive,
        }
    }

    /// Table and field to export, after config and argument merging
    pub fn column_query(&self) -> ColumnQuery {
        ColumnQuery::new(
            self.config.defaults.table.as_str(),
            self.config.defaults.field.as_str(),
        )
    }

    /// Export options derived from the effective configuration
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::from_config(&self.config)
    }

    /// Run a headless export
    ///
    /// The output file is opened (created or truncated) here, before the
    /// exporter touches the database.
    pub fn run_headless(&self, db: &Path, out: &Path) -> Result<ExportSummary> {
        let sink = create_output(out)?;
        let request = ExportRequest::new(db, sink, out.display().to_string(), self.column_query());
        let summary = export(request, &self.export_options())?;

        info!(
            "Wrote {} values ({} bytes) to {} in {} ms",
            summary.rows_exported,
            summary.bytes_written,
            out.display(),
            summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("{} version {}", self.info.name, self.info.version);
        println!("{}", self.info.description);
        println!("Authors: {}", self.info.authors);
        println!("License: {}", self.info.license);
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return;
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_with_comments()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}
