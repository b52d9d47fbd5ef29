//! DOF Archiver CLI
//!
//! Local execution entry point. For AWS Lambda, use `dof-archiver-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dof_archiver::{
    error::Result,
    models::{Config, IssueId, NoticeId, PublicationDate},
    pipeline::{self, GazetteResolver},
    services::HttpGazetteClient,
    storage::{self, KeyLayout},
};

/// dof-archiver - Diario Oficial de la Federación archiver
#[derive(Parser, Debug)]
#[command(
    name = "dof-archiver",
    version,
    about = "Archives DOF notices, issue PDFs and manifests to object storage"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Archive one publication date
    Run {
        /// Publication date as dd-mm-yyyy (default: today in Mexico City)
        #[arg(long)]
        date: Option<PublicationDate>,
    },

    /// Resolve issues and notices for a date and print the manifest
    Resolve {
        #[arg(long)]
        date: Option<PublicationDate>,
    },

    /// Validate the configuration file
    Validate,

    /// Print the storage keys for a date
    Keys {
        #[arg(long)]
        date: PublicationDate,

        /// Notice id (codNota)
        #[arg(long)]
        notice: Option<NoticeId>,

        /// Issue id (codDiario)
        #[arg(long)]
        issue: Option<IssueId>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn date_or_today(date: Option<PublicationDate>, config: &Config) -> Result<PublicationDate> {
    match date {
        Some(date) => Ok(date),
        None => PublicationDate::today(config.archive.utc_offset_hours),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();

    match cli.command {
        Command::Run { date } => {
            config.validate()?;
            let date = date_or_today(date, &config)?;
            let store = storage::open(&config.storage).await?;

            let report = pipeline::run_pipeline(&config, store.as_ref(), date).await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_complete() {
                log::warn!("Some objects could not be archived; rerun to retry them");
            }
        }

        Command::Resolve { date } => {
            config.validate()?;
            let date = date_or_today(date, &config)?;
            let client = HttpGazetteClient::from_config(&config.api)?;
            // resolving never writes, local storage is only a placeholder
            let store = storage::LocalStorage::new(&config.storage.local_root);

            let manifest = GazetteResolver::from_config(&config, &client, &store)
                .resolve(date)
                .await?;

            if manifest.has_content() {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                log::info!("Diario not found for {}", date);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Keys {
            date,
            notice,
            issue,
        } => {
            let keys = KeyLayout::new(&config.storage.prefix);
            println!("{}", keys.manifest_key(&date));
            if let Some(issue) = issue {
                println!("{}", keys.pdf_key(&date, &issue));
            }
            if let Some(notice) = notice {
                println!("{}", keys.document_key(&date, &notice));
            }
        }
    }

    Ok(())
}
