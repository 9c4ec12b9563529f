use crate::{
    error::CliError,
    shutdown::{Outcome, RunScope},
};
use clap::Parser;
use commands::Commands;
use engine_config::ImportConfig;
use engine_core::metrics::Metrics;
use engine_runtime::execution::{executor, factory};
use model::{records::object::encode_string_records, store::StoreState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod input;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "bulkload",
    version,
    about = "Bulk import with cluster ingest mode coordination"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let scope = RunScope::new();
    scope.listen();

    let result = run(cli.command, &scope).await;
    if let Err(err) = &result {
        error!("{err}");
    }

    Outcome::of(&result, &scope).into()
}

async fn run(command: Commands, scope: &RunScope) -> Result<(), CliError> {
    match command {
        Commands::Import {
            config,
            input,
            output,
        } => {
            let config = ImportConfig::load(&config).await?;
            let records = input::read_records(&input).await?;
            let rows = encode_string_records(&config.db, &records, chrono::Utc::now());
            info!(records = records.len(), bytes = rows.size_bytes(), "Encoded input records");

            let summary = executor::run(&config, &rows, scope.token()).await?;

            match output {
                Some(path) => output::write_report(&summary, path).await?,
                None => output::print_report(&summary)?,
            }
        }
        Commands::SwitchMode { config, mode } => {
            let config = ImportConfig::load(&config).await?;
            let metrics = Metrics::new();
            factory::create_mode_switcher(&config, metrics.clone())
                .assert_mode(mode)
                .await;

            let snap = metrics.snapshot();
            println!(
                "Switched {} store(s) to {mode} mode, {} failed",
                snap.mode_switch_requests - snap.mode_switch_failures,
                snap.mode_switch_failures
            );
        }
        Commands::Stores { config, min_state } => {
            let config = ImportConfig::load(&config).await?;
            let stores = factory::create_directory(&config)
                .list_stores(min_state.unwrap_or(StoreState::Tombstone))
                .await?;
            output::print_stores_table(&stores);
        }
    }

    Ok(())
}
