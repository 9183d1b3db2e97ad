use crate::{
    commands::{Commands, KeyCommand, RunArgs, TableCommand, TargetArgs},
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use chrono::SecondsFormat;
use clap::Parser;
use engine_config::report::summary::SummaryReport;
use engine_runtime::{error::PurgeError, execution::PurgeExecutor};
use model::{keys::partition_key, time::period::Period};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod resolve;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "purger",
    version,
    about = "Retention-driven purge for partitioned tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        global = true,
        help = "Log filter, e.g. 'info' or 'engine_processing=debug' (defaults to RUST_LOG, then info)"
    )]
    verbosity: Option<String>,

    #[arg(long, global = true, help = "KEY=VALUE file supplying PURGER_* defaults")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match &cli.verbosity {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    match cli.command {
        Commands::Purge { target, run } => purge(&target, &run, None, &env).await,
        Commands::PurgeWithin {
            target,
            run,
            from,
            to,
        } => {
            let period = Period::new(from, to)?;
            purge(&target, &run, Some(period), &env).await
        }
        Commands::Table {
            command: TableCommand::Create { target },
        } => {
            let table = resolve::table_name(&target, &env)?;
            let store = resolve::open_store(&target, &env, &table).await?;
            store.ensure_table_exists(&table).await?;
            store.flush().await?;
            info!(table = %table, "Table ready");
            Ok(ExitCode::Success)
        }
        Commands::Key { command } => {
            match command {
                KeyCommand::Encode { timestamp } => {
                    println!("{}", partition_key::encode(timestamp));
                }
                KeyCommand::Decode { key } => {
                    let ts = partition_key::decode(&key)?;
                    println!("{}", ts.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                }
            }
            Ok(ExitCode::Success)
        }
    }
}

async fn purge(
    target: &TargetArgs,
    run: &RunArgs,
    period: Option<Period>,
    env: &EnvManager,
) -> Result<ExitCode, CliError> {
    let table = resolve::table_name(target, env)?;
    let settings = resolve::settings(run, table.clone(), env)?;
    let store = resolve::open_store(target, env, &table).await?;

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let mut executor = PurgeExecutor::new(store.clone(), settings.clone(), shutdown.cancel_token())?;
    let outcome = match period {
        Some(period) => executor.purge_within(period).await,
        None => executor.purge().await,
    };

    // Deletes already applied are persisted even when the run failed.
    if let Err(err) = store.flush().await {
        error!(error = %err, "Failed to persist the table");
    }

    let report = match outcome {
        Ok(result) => SummaryReport::new(result, &executor.metrics().snapshot(), &settings),
        Err(PurgeError::NoDataFound { result, .. }) => {
            SummaryReport::nothing_to_purge(*result, &settings)
        }
        Err(err) => return Err(err.into()),
    };
    output::emit_report(&report, run.output.as_deref()).await?;

    if shutdown.is_shutdown_requested() {
        warn!("Purge interrupted");
        return Ok(ExitCode::Interrupted);
    }
    if report.result.has_errors() {
        warn!(
            failed_batches = report.result.batch_error_count,
            failed_rows = report.result.row_error_count,
            "Purge finished with failed batches"
        );
        return Ok(ExitCode::BatchErrors);
    }
    Ok(ExitCode::Success)
}
