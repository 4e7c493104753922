//! Pipeline configuration: category and query lists, link policy, search
//! page size.
//!
//! The configuration is an explicit immutable value passed into the
//! collector, never module-level state, so tests can substitute fixtures.
//! A built-in default covers the production categories; a YAML file given
//! via `--config` overrides it.

use std::error::Error;
use std::fs;

use serde::Deserialize;
use tracing::info;

/// One newsletter category: a display label, the search queries tried in
/// order, and the cap on accepted articles.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub label: String,
    pub queries: Vec<String>,
    pub max_articles: usize,
}

/// How the collector resolves a raw search item to a canonical link.
///
/// `PreferTrusted` takes the trusted-aggregator link when present and falls
/// back to the originating site; `TrustedOnly` drops everything that is not
/// on the trusted domain. Which of the two is intended production behavior
/// is an open stakeholder question (see DESIGN.md), so both are first-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    #[default]
    PreferTrusted,
    TrustedOnly,
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub categories: Vec<CategoryConfig>,
    pub link_policy: LinkPolicy,
    pub trusted_domain: String,
    /// Results requested per search query.
    pub page_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let category = |label: &str, queries: &[&str]| CategoryConfig {
            label: label.to_string(),
            queries: queries.iter().map(|q| q.to_string()).collect(),
            max_articles: 3,
        };

        Self {
            categories: vec![
                category(
                    "🌍 거시경제 & 금융",
                    &["코스피 마감 시황", "금감원 금융 제재", "한국은행 금리", "원달러 환율"],
                ),
                category(
                    "💻 반도체/IT",
                    &["삼성전자 반도체", "SK하이닉스 HBM", "반도체 수출 실적"],
                ),
                category(
                    "🔋 2차전지/에너지",
                    &["2차전지 배터리 수주", "LG에너지솔루션", "SK온 ESS"],
                ),
                category(
                    "🛡️ 금융/배당/방어주",
                    &["고배당주 ETF", "KB금융 배당", "주주환원 자사주"],
                ),
            ],
            link_policy: LinkPolicy::PreferTrusted,
            trusted_domain: "news.naver.com".to_string(),
            page_size: 10,
        }
    }
}

/// Load the pipeline configuration, from a YAML file when a path is given
/// and from the built-in defaults otherwise.
pub fn load_config(path: Option<&str>) -> Result<PipelineConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let config: PipelineConfig = serde_yaml::from_str(&raw)?;
            info!(path, categories = config.categories.len(), "Loaded pipeline config");
            Ok(config)
        }
        None => {
            let config = PipelineConfig::default();
            info!(categories = config.categories.len(), "Using built-in pipeline config");
            Ok(config)
        }
    }
}
