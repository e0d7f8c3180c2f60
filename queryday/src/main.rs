//! QueryDay command-line application.
//!
//! Each subcommand plays the part of one page of the original app: start a
//! session, then open the dashboards in any order. Fact groups are fetched
//! the first time they are requested and served from the record afterwards.
//!
//! ```bash
//! cargo run -p queryday -- start --date 2001-03-15 --city Paris
//! cargo run -p queryday -- core
//! cargo run -p queryday -- quiz
//! ```

mod commands;
mod quiz;

use clap::{Parser, Subcommand};
use queryday_core::BirthDate;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Trivia about the day you were born.
#[derive(Parser)]
#[command(name = "queryday", version)]
struct Cli {
    /// Directory holding the session record (overrides QUERYDAY_STATE_DIR).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Log cache activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new session. Any previous session and its facts are discarded.
    Start {
        /// Birth date as YYYY-MM-DD.
        #[arg(long)]
        date: BirthDate,

        /// City of birth, used for the weather archive.
        #[arg(long)]
        city: Option<String>,
    },
    /// Book, number, weather and events dashboard.
    Core,
    /// Film and music dashboard.
    Culture,
    /// Population and science dashboard.
    Tech,
    /// Print the stored record as JSON.
    Show,
    /// Ten questions about your origin date.
    Quiz {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Draw fortunes for the years ahead.
    Fortune {
        #[arg(long, default_value_t = queryday_core::fortune::DEFAULT_FORTUNE_COUNT)]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the share phrase and artifact file name.
    Share,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = match commands::App::open(cli.state_dir) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("queryday: error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Start { date, city } => app.start(date, city).await,
        Command::Core => app.core().await,
        Command::Culture => app.culture().await,
        Command::Tech => app.tech().await,
        Command::Show => app.show().await,
        Command::Quiz { seed } => app.quiz(seed).await,
        Command::Fortune { count, seed } => app.fortune(count, seed),
        Command::Share => app.share().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("queryday: error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
