//! JSON artifact persistence between pipeline stages.
//!
//! The collector writes `articles.json`; the verifier reads it and writes
//! `verified_articles.json`; the renderer reads that. Both files carry the
//! same `ArticleSet` schema, pretty-printed for inspection.

use std::error::Error;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::models::ArticleSet;

/// File name of the collector's output.
pub const COLLECTED_FILE: &str = "articles.json";
/// File name of the verifier's output.
pub const VERIFIED_FILE: &str = "verified_articles.json";

/// Serialize an [`ArticleSet`] to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_article_set(set: &ArticleSet, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(set)?;
    fs::write(path, json).await?;
    info!(articles = set.total_articles(), "Wrote article set");
    Ok(())
}

/// Read an [`ArticleSet`] back from `path`.
///
/// Existence is the caller's concern (a missing file is a stage-level
/// error with its own exit code); this only handles read and parse.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_article_set(path: &Path) -> Result<ArticleSet, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let set: ArticleSet = serde_json::from_str(&raw)?;
    info!(articles = set.total_articles(), "Read article set");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, CategoryArticles};

    fn sample_set() -> ArticleSet {
        ArticleSet {
            date: "2026-02-16".to_string(),
            categories: vec![CategoryArticles {
                label: "시황".to_string(),
                articles: vec![Article {
                    title: "코스피 상승 마감".to_string(),
                    url: "https://news.naver.com/a/1".to_string(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_artifact_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data").join(COLLECTED_FILE);

        let set = sample_set();
        write_article_set(&set, &path).await.unwrap();
        let read_back = read_article_set(&path).await.unwrap();
        assert_eq!(read_back, set);
    }

    #[tokio::test]
    async fn test_written_artifact_is_pretty_printed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(COLLECTED_FILE);

        write_article_set(&sample_set(), &path).await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("\"date\": \"2026-02-16\""));
    }

    #[tokio::test]
    async fn test_read_missing_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_article_set(&tmp.path().join("absent.json")).await.is_err());
    }

    #[tokio::test]
    async fn test_read_malformed_json_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        assert!(read_article_set(&path).await.is_err());
    }
}
