use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use clap::{ArgAction, Parser, Subcommand};
use envirobase::{
    config::Config,
    db, logging,
    services::{PageLimits, ReferenceService},
};

mod reference_csv;

#[derive(Parser)]
#[command(
    name = "envirobase",
    about = "Operator commands for an envirobase database",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the embedded SQL migrations.
    Migrate,

    /// Load the USGS parameter-code table from a CSV file (13 columns).
    ImportParameters {
        /// CSV export of the parameter-code table.
        csv: PathBuf,
        /// Replace existing rows instead of refusing to load into a non-empty table.
        #[arg(long, action = ArgAction::SetTrue)]
        replace: bool,
    },

    /// Load the USGS medium-code table from a CSV file (4 columns).
    ImportMedia {
        /// CSV export of the medium-code table.
        csv: PathBuf,
        /// Replace existing rows instead of refusing to load into a non-empty table.
        #[arg(long, action = ArgAction::SetTrue)]
        replace: bool,
    },

    /// Print the version.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Migrate => run_migrate(&config).await?,
        Commands::ImportParameters { csv, replace } => {
            run_import_parameters(&config, &csv, replace).await?
        }
        Commands::ImportMedia { csv, replace } => run_import_media(&config, &csv, replace).await?,
        Commands::Version => {}
    }

    Ok(())
}

async fn run_migrate(config: &Config) -> Result<()> {
    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to apply migrations")?;
    eprintln!("✓ Database schema is up to date");
    Ok(())
}

async fn run_import_parameters(config: &Config, path: &Path, replace: bool) -> Result<()> {
    let parameters = reference_csv::parse_parameters(open_csv(path)?)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let service = reference_service(config).await?;
    let written = service
        .import_parameters(&parameters, replace)
        .await
        .context("Failed to import parameter codes")?;
    eprintln!(
        "✓ Loaded {written} parameter codes from {}",
        path.display()
    );
    Ok(())
}

async fn run_import_media(config: &Config, path: &Path, replace: bool) -> Result<()> {
    let codes = reference_csv::parse_medium_codes(open_csv(path)?)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let service = reference_service(config).await?;
    let written = service
        .import_medium_codes(&codes, replace)
        .await
        .context("Failed to import medium codes")?;
    eprintln!("✓ Loaded {written} medium codes from {}", path.display());
    Ok(())
}

fn open_csv(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

async fn reference_service(config: &Config) -> Result<ReferenceService> {
    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    Ok(ReferenceService::new(
        pool,
        PageLimits::from_config(&config.app),
    ))
}
