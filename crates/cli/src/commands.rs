use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use engine_config::settings::{split::SplitPolicy, strategy::Strategy};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Delete every row older than the retention period
    Purge {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Delete every row whose partition key falls in [from, to)
    PurgeWithin {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        run: RunArgs,

        #[arg(long, help = "Inclusive start, RFC 3339")]
        from: DateTime<Utc>,

        #[arg(long, help = "Exclusive end, RFC 3339")]
        to: DateTime<Utc>,
    },
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },
    /// Convert between instants and partition keys
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
}

#[derive(Subcommand)]
pub enum TableCommand {
    /// Create the table if it does not exist yet
    Create {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    Encode {
        #[arg(help = "Instant to encode, RFC 3339")]
        timestamp: DateTime<Utc>,
    },
    Decode {
        #[arg(help = "19-digit partition key")]
        key: String,
    },
}

/// Which table to work on and where it lives.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long, help = "Table name (falls back to PURGER_TABLE)")]
    pub table: Option<String>,

    #[arg(
        long,
        help = "Table file path, or memory:// for a throwaway table (falls back to PURGER_STORE)"
    )]
    pub store: Option<String>,

    #[arg(long, help = "Page size used when reading the table")]
    pub page_size: Option<usize>,
}

/// Overrides applied on top of the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long, help = "JSON settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Rows older than this many days are deleted")]
    pub retention_days: Option<u32>,

    #[arg(long, help = "Worker count (falls back to PURGER_WORKERS)")]
    pub workers: Option<usize>,

    #[arg(long, help = "fan-in or worker-pool")]
    pub strategy: Option<Strategy>,

    #[arg(
        long,
        help = "workers, count:<n> or every:<n>[s|m|h|d]; count and every need worker-pool"
    )]
    pub split: Option<SplitPolicy>,

    #[arg(long, help = "Rows per delete batch, at most 100")]
    pub batch_size: Option<usize>,

    #[arg(long, help = "Walk the table and report without deleting anything")]
    pub dry_run: bool,

    #[arg(
        long,
        help = "If specified, writes the JSON report to this file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}
