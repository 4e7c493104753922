//! # Daily Digest
//!
//! A daily newsletter pipeline in three standalone stages:
//!
//! 1. **collect** — search the news API for each category's queries, keep
//!    only articles published on the target date (yesterday by default),
//!    dedup and cap per category, write `articles.json`
//! 2. **verify** — re-fetch every collected link, classify it live or dead
//!    from the HTTP response alone, write the surviving subset as
//!    `verified_articles.json`
//! 3. **render** — assemble the digest context (headline, briefing,
//!    calendar strip, optional AI insight) and write the newsletter HTML
//!
//! Each stage persists its output as a flat JSON artifact consumed by the
//! next, so the stages can run as separate cron steps.
//!
//! ## Usage
//!
//! ```sh
//! daily_digest collect   # needs NAVER_CLIENT_ID / NAVER_CLIENT_SECRET
//! daily_digest verify
//! daily_digest render    # optional OPENAI_API_KEY for the AI insight
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collect;
mod config;
mod digest;
mod error;
mod insight;
mod liveness;
mod models;
mod outputs;
mod search;
mod utils;
mod verify;

use cli::{Cli, Command};
use config::PipelineConfig;
use error::PipelineError;
use insight::InsightSource;
use liveness::{DeadPageMatcher, HttpFetcher};
use outputs::json::{COLLECTED_FILE, VERIFIED_FILE, read_article_set, write_article_set};
use search::NaverNewsClient;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();

    if let Err(e) = run(args).await {
        error!(error = %e, "Stage failed");
        let code = e
            .downcast_ref::<PipelineError>()
            .map(PipelineError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(args: Cli) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    let config = config::load_config(args.config.as_deref())?;
    let data_dir = PathBuf::from(&args.data_dir);

    match args.command {
        Command::Collect {
            naver_client_id,
            naver_client_secret,
            date,
        } => {
            run_collect(&config, &data_dir, naver_client_id, naver_client_secret, date).await?;
        }
        Command::Verify => {
            run_verify(&data_dir).await?;
        }
        Command::Render {
            public_dir,
            openai_api_key,
            insight_model,
        } => {
            run_render(&data_dir, &public_dir, openai_api_key, &insight_model).await?;
        }
    }

    info!(elapsed = ?start_time.elapsed(), "Stage complete");
    Ok(())
}

/// Require that an upstream stage has left its artifact behind.
fn require_artifact(path: &Path, producer: &'static str) -> Result<(), PipelineError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingArtifact {
            path: path.display().to_string(),
            producer,
        })
    }
}

async fn run_collect(
    config: &PipelineConfig,
    data_dir: &Path,
    client_id: Option<String>,
    client_secret: Option<String>,
    date: Option<NaiveDate>,
) -> Result<(), Box<dyn Error>> {
    let (Some(client_id), Some(client_secret)) = (
        client_id.filter(|s| !s.is_empty()),
        client_secret.filter(|s| !s.is_empty()),
    ) else {
        return Err(PipelineError::MissingCredentials("NAVER_CLIENT_ID", "NAVER_CLIENT_SECRET").into());
    };

    ensure_writable_dir(&data_dir.display().to_string()).await?;

    let target_date = date.unwrap_or_else(|| Local::now().date_naive() - Duration::days(1));
    info!(%target_date, "Collecting yesterday's articles");

    let client = NaverNewsClient::new(client_id, client_secret, config.page_size);
    let set = collect::collect(config, &client, target_date).await;
    info!(articles = set.total_articles(), "Collection complete");

    write_article_set(&set, &data_dir.join(COLLECTED_FILE)).await
}

async fn run_verify(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let collected_path = data_dir.join(COLLECTED_FILE);
    require_artifact(&collected_path, "collect")?;

    let set = read_article_set(&collected_path).await?;
    let fetcher = HttpFetcher::new();
    let matcher = DeadPageMatcher::default();
    let verified = verify::verify(set, &fetcher, &matcher).await;

    write_article_set(&verified, &data_dir.join(VERIFIED_FILE)).await
}

async fn run_render(
    data_dir: &Path,
    public_dir: &str,
    openai_api_key: Option<String>,
    insight_model: &str,
) -> Result<(), Box<dyn Error>> {
    let verified_path = data_dir.join(VERIFIED_FILE);
    require_artifact(&verified_path, "verify")?;
    ensure_writable_dir(public_dir).await?;

    let set = read_article_set(&verified_path).await?;
    let insight = InsightSource::from_credentials(openai_api_key, insight_model);
    let today = Local::now().date_naive();

    let context = digest::build_context(set, today, &insight).await;
    let html = outputs::html::render_digest(&context);
    outputs::html::write_digest(&html, Path::new(public_dir)).await
}
