//! Command line of the history exporter.
//!
//! Besides the export itself, provides the maintenance tools working on
//! report files.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use tokio::{fs, time};
use tracing::{error, info};

use crate::{
    configuration::{get_configuration, set_configuration, AppState, Config, State},
    error::Error,
    exporter::{snapshot_repository, Exporter},
    normalization::AddressNormalizer,
    provider::{DatabasePool, HTTP},
    reporting::{TransactionsReportReader, TransactionsReportWriter},
};

/// Deposits and withdrawals history exporter
#[derive(Parser)]
#[command(name = "history-exporter")]
#[command(about = "Multi-chain deposits and withdrawals history exporter", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one export (default if no command specified)
    Export,

    /// Run an export every EXPORT_INTERVAL_IN_HOURS
    Serve,

    /// Replace the stored snapshot with a local report file
    UploadSnapshot {
        /// Report file in the snapshot format
        #[arg(long)]
        file: PathBuf,
    },

    /// Rewrite a report without malformed or invalid records
    FilterReport {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },
}

pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

/// Shared state. The database pool is opened only when `DATABASE_URL` is
/// set and the command needs storage.
pub async fn init_state(
    config: Config,
    with_database: bool,
) -> Result<AppState<State>, Error> {
    let database = match (&config.database_url, with_database) {
        (Some(url), true) => Some(DatabasePool::new(url).await?),
        _ => None,
    };
    let http = HTTP::new(&config)?;
    let state = State::new(config, database, http).await?;

    Ok(AppState::new(state))
}

pub async fn run_export(app_state: AppState<State>) -> Result<(), Error> {
    Exporter::new(app_state)?.export().await?;

    Ok(())
}

/// Starts an export on every tick. A tick arriving while the previous
/// export still runs is skipped by the exporter.
pub async fn run_serve(app_state: AppState<State>) -> Result<(), Error> {
    let hours = app_state.config.export_interval_in_hours;

    if hours == 0 {
        return Err(Error::ConfigurationError(String::from(
            "EXPORT_INTERVAL_IN_HOURS must be positive",
        )));
    }

    let exporter = Arc::new(Exporter::new(app_state)?);
    let mut interval = time::interval(Duration::from_secs(hours * 60 * 60));

    info!("Exporting transactions history every {} hours", hours);

    loop {
        interval.tick().await;

        let exporter = exporter.clone();
        tokio::spawn(async move {
            if let Err(e) = exporter.export().await {
                error!("Transactions export failed: {}", e);
            }
        });
    }
}

pub async fn run_upload_snapshot(
    app_state: AppState<State>,
    file: PathBuf,
) -> Result<usize, Error> {
    info!("Uploading {} as transactions snapshot...", file.display());

    let data = fs::read(&file).await?;
    let count = snapshot_repository(&app_state).replace(data).await?;

    info!("Transactions snapshot with {} transactions uploaded", count);

    Ok(count)
}

/// Returns the number of kept and dropped records.
pub async fn run_filter_report(
    normalizer: Arc<AddressNormalizer>,
    input: PathBuf,
    output: PathBuf,
) -> Result<(usize, usize), Error> {
    info!("Filtering report {}...", input.display());

    let data = fs::read(&input).await?;
    let (transactions, dropped) =
        TransactionsReportReader::new(normalizer).read_valid(data.as_slice())?;
    let kept = transactions.len();

    fs::write(&output, TransactionsReportWriter::to_bytes(&transactions)?).await?;

    info!(
        "Report filtering done. {} transactions kept, {} records dropped, saved to {}",
        kept,
        dropped,
        output.display()
    );

    Ok((kept, dropped))
}
