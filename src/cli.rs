//! Command-line interface definitions.
//!
//! One binary, three subcommands, one per pipeline stage, so each stage is
//! independently invocable from cron or CI. Credentials come in through
//! environment variables via clap's `env` attribute.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Command-line arguments for the daily digest pipeline.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory for the intermediate JSON artifacts
    #[arg(short, long, default_value = "data")]
    pub data_dir: String,

    /// Optional path to a YAML pipeline config (categories, link policy)
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search yesterday's news per category and write articles.json
    Collect {
        /// Naver developer Client ID
        #[arg(long, env = "NAVER_CLIENT_ID")]
        naver_client_id: Option<String>,

        /// Naver developer Client Secret
        #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
        naver_client_secret: Option<String>,

        /// Target date (YYYY-MM-DD); defaults to yesterday
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Re-fetch every collected link and drop the dead ones
    Verify,

    /// Render the HTML newsletter from the verified articles
    Render {
        /// Output directory for the rendered pages
        #[arg(long, default_value = "public")]
        public_dir: String,

        /// API key for the optional AI insight; without it the
        /// deterministic fallback sentence is used
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_api_key: Option<String>,

        /// Model used for the AI insight
        #[arg(long, default_value = "gpt-4o-mini")]
        insight_model: String,
    },
}
