use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use commands::Commands;
use denormal_core::Database;
use denormal_core::refresh::Progress;
use progress::ProgressBar;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod progress;

#[derive(Parser)]
#[command(name = "denormal", version, about = "Denormalized field maintenance")]
struct Cli {
    /// Database directory
    #[arg(long, env = "DENORMAL_DATABASE", default_value = "./denormal_db", global = true)]
    database: PathBuf,

    /// 0 = errors only, 1 = normal, 2 = verbose, 3 = very verbose
    #[arg(short, long, default_value_t = 1, global = true)]
    verbosity: u8,

    /// Rows fetched per query, overriding the database settings
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Do not draw a progress bar
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let mut db = Database::open(&cli.database)
        .with_context(|| format!("failed to open database at {}", cli.database.display()))?;
    if let Some(chunk_size) = cli.chunk_size {
        if chunk_size == 0 {
            bail!("--chunk-size must be greater than zero");
        }
        db.settings_mut().chunk_size = chunk_size;
    }

    match cli.command {
        Commands::UpdateFields { fields } => {
            info!(fields = ?fields, "update-fields");
            let mut bar = ProgressBar::stderr();
            let progress: Option<&mut dyn Progress> =
                if db.settings().progress && !cli.no_progress {
                    Some(&mut bar as &mut dyn Progress)
                } else {
                    None
                };
            let reports = db
                .update_fields(&fields, progress)
                .context("update-fields failed, no changes were committed")?;
            if cli.verbosity > 0 {
                for report in reports {
                    println!(
                        "updated {} rows of {} ({})",
                        report.rows,
                        report.table,
                        report.columns.join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}
