//! repertoire-drill: terminal front-end for the opening repertoire trainer.
//!
//! Talks to the repertoire backend over HTTP (see [`config`] for the
//! environment variables) and drills lines interactively on stdin/stdout.
//! Logs go to daily-rolling files because stdout is the drill surface.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use repertoire_client::{ClientError, RepertoireClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trainer::{PathLesson, TrainerError, TrainingService};

mod config;
mod drill;

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "repertoire-drill", about = "Drill your opening repertoire with spaced repetition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train lines from a repertoire.
    Train {
        /// Repertoire id.
        #[arg(short, long)]
        repertoire: String,

        /// Number of lines to drill (defaults to REPERTOIRE_SESSION_SIZE).
        #[arg(short, long)]
        count: Option<usize>,
    },
    /// Show today's progress against the study plan.
    Plan,
    /// Show the next lesson on the study path.
    Next,
    /// Remove a line from the study path.
    Forget {
        #[arg(short, long)]
        repertoire: String,

        #[arg(short, long)]
        variant: String,
    },
    /// Print study analytics as JSON.
    Analytics,
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("backend client error: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Trainer(#[from] TrainerError),

    #[error("training error: {0}")]
    Session(#[from] trainer::SessionError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_logging(log_dir: &Path) -> WorkerGuard {
    std::fs::create_dir_all(log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(log_dir, "repertoire-drill");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    guard
}

async fn handle_train(
    service: &TrainingService<RepertoireClient>,
    repertoire_id: &str,
    count: usize,
) -> Result<(), CliError> {
    let mut rng = StdRng::from_entropy();
    let mut board = service
        .start_session(repertoire_id, count, Utc::now(), &mut rng)
        .await?;

    let input = BufReader::new(tokio::io::stdin()).lines();
    let mut drill = drill::Drill::new(service, input, std::io::stdout(), config::get_opponent_delay());
    let summary = drill.run(&mut board, &mut rng).await?;
    if summary.reviews_submitted > 0 {
        println!("{} review(s) saved.", summary.reviews_submitted);
    }
    Ok(())
}

async fn handle_plan(service: &TrainingService<RepertoireClient>) {
    let progress = service.today_progress().await;
    println!(
        "Today: {}/{} done ({}%)",
        progress.completed_today, progress.planned_target, progress.progress_percent
    );
    println!(
        "  reviews {}/{}, new {}/{}",
        progress.completed_reviews, progress.review_target, progress.completed_new, progress.new_target
    );
    println!("{}", progress.message);
}

async fn handle_next(service: &TrainingService<RepertoireClient>) -> Result<(), CliError> {
    match service.next_lesson().await? {
        PathLesson::Variant {
            repertoire_name,
            variant_name,
            errors,
            ..
        } => println!("Review: {variant_name} ({repertoire_name}), {errors} past error(s)"),
        PathLesson::NewVariant {
            repertoire_name,
            variant_name,
            ..
        } => println!("New line: {variant_name} ({repertoire_name})"),
        PathLesson::Empty => println!("Nothing left on the path today."),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let _guard = init_logging(&config::get_log_dir());

    let api_url = config::get_api_url();
    tracing::info!(api_url = %api_url, "repertoire-drill starting");
    let client = RepertoireClient::new(&api_url, config::get_api_timeout())?;
    let service = TrainingService::new(Arc::new(client));

    match cli.command {
        Commands::Train { repertoire, count } => {
            let count = count.unwrap_or_else(config::get_session_size);
            handle_train(&service, &repertoire, count).await?;
        }
        Commands::Plan => handle_plan(&service).await,
        Commands::Next => handle_next(&service).await?,
        Commands::Forget { repertoire, variant } => {
            service.forget_variant(&repertoire, &variant).await?;
            println!("Removed {variant} from the study path.");
        }
        Commands::Analytics => {
            let analytics = service.analytics().await?;
            println!("{}", serde_json::to_string_pretty(&analytics)?);
        }
    }

    tracing::info!("repertoire-drill done");
    Ok(())
}
