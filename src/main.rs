//! NSRL RDSv3 Extractor
//!
//! Writes one field of an NSRL RDSv3 SQLite database to a text file, one
//! value per line, for import as a hash set.
//!
//! # Usage
//!
//! ```bash
//! # Headless
//! nsrl-extract -o md5.txt -t FILE -f md5 RDS_2024.03.1_modern.db
//!
//! # Interactive form
//! nsrl-extract --interactive
//! ```

use nsrl_extract::AppInfo;
use nsrl_extract::Result;
use nsrl_extract::cli::{CliInterface, Mode};
use nsrl_extract::interactive::{self, ReedlinePrompter};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands, or run the selected mode
fn run() -> Result<()> {
    let cli = CliInterface::new(AppInfo::current())?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    match cli.mode() {
        Mode::Headless { db, out } => {
            cli.run_headless(&db, &out)?;
        }
        Mode::Interactive => {
            let mut prompter = ReedlinePrompter::new(cli.config().display.color_output);
            interactive::run(cli.info(), cli.config(), &mut prompter)?;
        }
    }

    Ok(())
}

/// Initialize logging system from the effective configuration
///
/// Logs go to stderr so they never mix with exported data or prompts.
/// `RUST_LOG`, when set, replaces the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from(level).into()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
