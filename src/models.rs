//! Data models for collected articles and liveness verdicts.
//!
//! This module defines the shapes that flow between the pipeline stages:
//! - [`RawItem`]: one result record from the news search API, discarded
//!   after filtering
//! - [`Article`] / [`CategoryArticles`] / [`ArticleSet`]: the persisted
//!   artifact schema shared by `articles.json` and `verified_articles.json`
//! - [`LivenessVerdict`]: the live/dead classification for one URL, never
//!   persisted

use std::fmt;

use serde::{Deserialize, Serialize};

/// One raw result from the news search API.
///
/// `title` may contain inline markup (`<b>` highlights) and HTML entities;
/// the collector strips both before anything is kept. `pub_date` is the
/// wire-format timestamp, e.g. `"Mon, 16 Feb 2026 09:00:00 +0900"`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub originallink: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// A collected article: plain-text title and canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
}

/// The articles accepted for one category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryArticles {
    pub label: String,
    pub articles: Vec<Article>,
}

/// The persisted artifact: one day's articles, grouped by category.
///
/// Written by the collector as `articles.json`, rewritten as a subset by
/// the verifier as `verified_articles.json`, read-only afterwards. `date`
/// is the target date in `YYYY-MM-DD`, fixed by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSet {
    pub date: String,
    pub categories: Vec<CategoryArticles>,
}

impl ArticleSet {
    pub fn total_articles(&self) -> usize {
        self.categories.iter().map(|c| c.articles.len()).sum()
    }
}

/// Why a URL was classified the way it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictReason {
    /// Transport failure while fetching; carries the cause for diagnostics.
    ConnectionError(String),
    /// Final response status was an error.
    HttpStatus(u16),
    /// The redirect chain collapsed to a bare domain (soft 404).
    RedirectedToHomepage,
    /// The body contained a known dead-page phrase.
    DeadPhrase(String),
    /// None of the title's tokens appeared anywhere in the body.
    TitleMismatch,
    /// The page looks alive.
    Ok,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictReason::ConnectionError(cause) => write!(f, "connection error: {cause}"),
            VerdictReason::HttpStatus(status) => write!(f, "http {status}"),
            VerdictReason::RedirectedToHomepage => write!(f, "redirected to homepage"),
            VerdictReason::DeadPhrase(phrase) => write!(f, "dead phrase '{phrase}'"),
            VerdictReason::TitleMismatch => write!(f, "title mismatch"),
            VerdictReason::Ok => write!(f, "ok"),
        }
    }
}

/// The classification for one URL. Every path through the classifier ends
/// in a definite verdict; there is no unknown state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessVerdict {
    pub is_dead: bool,
    pub reason: VerdictReason,
}

impl LivenessVerdict {
    pub fn dead(reason: VerdictReason) -> Self {
        Self {
            is_dead: true,
            reason,
        }
    }

    pub fn live() -> Self {
        Self {
            is_dead: false,
            reason: VerdictReason::Ok,
        }
    }
}
