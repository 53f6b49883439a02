use std::sync::Arc;

use clap::Parser;
use tracing::{error, Level};

use history_exporter::{
    cli::{
        init_config, init_state, run_export, run_filter_report, run_serve,
        run_upload_snapshot, Cli, Commands,
    },
    error::Error,
    normalization::AddressNormalizer,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = match init_config() {
        Ok(config) => config,
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    match cli.command.unwrap_or(Commands::Export) {
        Commands::Export => {
            run_export(init_state(config, true).await?).await?;
        },
        Commands::Serve => {
            run_serve(init_state(config, true).await?).await?;
        },
        Commands::UploadSnapshot { file } => {
            run_upload_snapshot(init_state(config, false).await?, file).await?;
        },
        Commands::FilterReport { input, output } => {
            let normalizer = AddressNormalizer::from_config(&config);
            run_filter_report(Arc::new(normalizer), input, output).await?;
        },
    }

    Ok(())
}
