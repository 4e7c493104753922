//! Optional AI market insight for the digest, with a deterministic fallback.
//!
//! The insight is a capability behind [`InsightGenerator`] with two
//! implementations: a remote OpenAI-compatible chat call fed the day's
//! titles, and a local deterministic sentence built from the first article
//! title per category. Which one runs is decided once at startup from
//! credential presence; the rendering code never branches on it. A failed
//! remote call degrades to the deterministic sentence and never blocks the
//! pipeline.

use std::error::Error;
use std::time::Duration;

use itertools::Itertools;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::models::ArticleSet;
use crate::utils::truncate_for_log;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_OUTPUT_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;
const MAX_ATTEMPTS: usize = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Capability for producing the digest's one-paragraph market insight.
pub trait InsightGenerator {
    async fn generate(&self, set: &ArticleSet) -> Result<String, Box<dyn Error>>;
}

/// Remote text-generation call against an OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct RemoteInsight {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl RemoteInsight {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    async fn request_insight(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = truncate_for_log(&response.text().await.unwrap_or_default(), 300);
            return Err(format!("insight API returned {status}: {body}").into());
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or("insight API returned an empty completion")?;
        Ok(text)
    }
}

impl InsightGenerator for RemoteInsight {
    #[instrument(level = "info", skip_all)]
    async fn generate(&self, set: &ArticleSet) -> Result<String, Box<dyn Error>> {
        let prompt = build_prompt(set);
        let mut attempt = 0usize;

        loop {
            match self.request_insight(&prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        return Err(e);
                    }
                    let jitter = Duration::from_millis(rng().random_range(0..=250));
                    let delay = BASE_DELAY.saturating_mul(1 << (attempt - 1)) + jitter;
                    warn!(attempt, error = %e, ?delay, "Insight request failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Deterministic local fallback: a templated sentence from the first title
/// of each non-empty category.
#[derive(Debug, Default)]
pub struct FallbackInsight;

impl InsightGenerator for FallbackInsight {
    async fn generate(&self, set: &ArticleSet) -> Result<String, Box<dyn Error>> {
        Ok(fallback_sentence(set))
    }
}

pub fn fallback_sentence(set: &ArticleSet) -> String {
    let leads: Vec<&str> = set
        .categories
        .iter()
        .filter_map(|category| category.articles.first())
        .map(|article| article.title.as_str())
        .collect();

    if leads.is_empty() {
        "어제는 주요 시장 뉴스가 수집되지 않았습니다.".to_string()
    } else {
        format!("어제 시장의 주요 소식: {}.", leads.iter().join(" / "))
    }
}

fn build_prompt(set: &ArticleSet) -> String {
    let titles = set
        .categories
        .iter()
        .flat_map(|category| category.articles.iter())
        .map(|article| format!("- {}", article.title))
        .join("\n");

    format!(
        "다음은 {}에 보도된 주요 시장 뉴스 헤드라인입니다.\n{}\n\n\
         위 헤드라인을 바탕으로 오늘의 시장 인사이트를 한국어 두세 문장으로 요약해 주세요.",
        set.date, titles
    )
}

/// The generator chosen for this run, fixed at startup from credential
/// presence.
pub enum InsightSource {
    Remote(RemoteInsight),
    Fallback(FallbackInsight),
}

impl InsightSource {
    pub fn from_credentials(api_key: Option<String>, model: &str) -> Self {
        match api_key.filter(|key| !key.is_empty()) {
            Some(key) => {
                info!(model, "AI insight enabled");
                InsightSource::Remote(RemoteInsight::new(key, model.to_string()))
            }
            None => {
                info!("No insight credential; using deterministic fallback");
                InsightSource::Fallback(FallbackInsight)
            }
        }
    }

    /// Produce the digest insight, degrading to the deterministic sentence
    /// on any generation failure.
    pub async fn today_insight(&self, set: &ArticleSet) -> String {
        let result = match self {
            InsightSource::Remote(generator) => generator.generate(set).await,
            InsightSource::Fallback(generator) => generator.generate(set).await,
        };

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Insight generation failed; using deterministic fallback");
                fallback_sentence(set)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, CategoryArticles};

    fn set_with(titles_per_category: Vec<Vec<&str>>) -> ArticleSet {
        ArticleSet {
            date: "2026-02-16".to_string(),
            categories: titles_per_category
                .into_iter()
                .enumerate()
                .map(|(i, titles)| CategoryArticles {
                    label: format!("카테고리 {i}"),
                    articles: titles
                        .into_iter()
                        .map(|t| Article {
                            title: t.to_string(),
                            url: format!("https://n/{t}"),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_fallback_sentence_uses_first_title_per_category() {
        let set = set_with(vec![
            vec!["코스피 상승 마감", "외국인 순매수"],
            vec![],
            vec!["HBM 수주 확대"],
        ]);
        assert_eq!(
            fallback_sentence(&set),
            "어제 시장의 주요 소식: 코스피 상승 마감 / HBM 수주 확대."
        );
    }

    #[test]
    fn test_fallback_sentence_when_everything_is_empty() {
        let set = set_with(vec![vec![], vec![]]);
        assert_eq!(
            fallback_sentence(&set),
            "어제는 주요 시장 뉴스가 수집되지 않았습니다."
        );
    }

    #[test]
    fn test_fallback_sentence_is_deterministic() {
        let set = set_with(vec![vec!["코스피 상승 마감"]]);
        assert_eq!(fallback_sentence(&set), fallback_sentence(&set));
    }

    #[test]
    fn test_prompt_contains_every_title_and_the_date() {
        let set = set_with(vec![vec!["코스피 상승"], vec!["HBM 수주"]]);
        let prompt = build_prompt(&set);
        assert!(prompt.contains("2026-02-16"));
        assert!(prompt.contains("- 코스피 상승"));
        assert!(prompt.contains("- HBM 수주"));
    }

    #[test]
    fn test_source_selection_follows_credential_presence() {
        assert!(matches!(
            InsightSource::from_credentials(None, "gpt-4o-mini"),
            InsightSource::Fallback(_)
        ));
        assert!(matches!(
            InsightSource::from_credentials(Some(String::new()), "gpt-4o-mini"),
            InsightSource::Fallback(_)
        ));
        assert!(matches!(
            InsightSource::from_credentials(Some("sk-test".to_string()), "gpt-4o-mini"),
            InsightSource::Remote(_)
        ));
    }

    #[tokio::test]
    async fn test_today_insight_without_credentials_is_the_fallback() {
        let set = set_with(vec![vec!["코스피 상승 마감"]]);
        let source = InsightSource::from_credentials(None, "gpt-4o-mini");
        assert_eq!(source.today_insight(&set).await, fallback_sentence(&set));
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  시장 요약입니다.  "}}]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let content = parsed.choices[0].message.content.as_deref().map(str::trim);
        assert_eq!(content, Some("시장 요약입니다."));
    }
}
