//! Link liveness classification.
//!
//! The search API gives no authoritative deletion signal, so a collected
//! link has to be re-fetched and judged from the HTTP response alone. The
//! checks run in a strict order, cheapest signal first, and every path ends
//! in a definite verdict:
//!
//! 1. transport failure
//! 2. error status code
//! 3. redirect collapsing to a bare domain (soft 404)
//! 4. dead-page phrase in the body
//! 5. none of the title's tokens in the body (only when a title is given)
//!
//! One fetch serves all checks; the body is never re-fetched.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;
use url::Url;

use crate::error::FetchError;
use crate::models::{LivenessVerdict, VerdictReason};

/// Some article hosts serve bot-looking user agents an error page, so the
/// fetch announces itself as a desktop browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Phrases that mark a dead article page, ordered, matched case-insensitively
/// as substrings. Korean phrases are first-class: the collected articles are
/// Korean-language and publishers localize their error pages.
const DEAD_PAGE_PHRASES: &[&str] = &[
    "페이지를 찾을 수 없습니다",
    "존재하지 않는 페이지",
    "존재하지 않는 기사",
    "삭제된 기사",
    "기사가 삭제되었습니다",
    "요청하신 페이지를",
    "찾을 수 없",
    "기사가 없습니다",
    "기사를 찾을 수",
    "해당 기사가 존재하지",
    "유효하지 않은 기사",
    "잘못된 접근",
    "권한이 없습니다",
    "404 not found",
    "page not found",
    "invalid article",
    "article removed",
    "access denied",
    "forbidden",
    "이 기사는 더 이상",
    "서비스가 종료",
];

/// One fetched page, after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

/// The narrow fetch seam the classifier depends on. A future concurrent
/// fetcher can replace [`HttpFetcher`] without touching classifier logic.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Blocking-per-request HTTP fetcher with a browser user agent and redirect
/// following. One connection per request, no pooling guarantees.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }
}

/// Ordered dead-page phrase list. Pluggable so more locales can be added
/// without touching the classifier's control flow.
#[derive(Debug, Clone)]
pub struct DeadPageMatcher {
    phrases: Vec<String>,
}

impl DeadPageMatcher {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    /// First phrase occurring in the (already lowercased) body, if any.
    fn matched_phrase(&self, body_lower: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|phrase| body_lower.contains(phrase.as_str()))
            .map(|phrase| phrase.as_str())
    }
}

impl Default for DeadPageMatcher {
    fn default() -> Self {
        Self::new(DEAD_PAGE_PHRASES.iter().copied())
    }
}

static TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Title words of at least two characters, punctuation stripped.
fn title_tokens(title: &str) -> Vec<String> {
    TOKEN_SPLIT
        .split(title)
        .filter(|word| word.chars().count() >= 2)
        .map(|word| word.to_lowercase())
        .collect()
}

/// Does the final URL collapse to a bare domain?
///
/// Expired-article URLs often get a 200 redirect to the front page; a URL
/// with no path segments and no query after redirects is that case.
fn is_bare_domain(final_url: &str) -> bool {
    match Url::parse(final_url) {
        Ok(url) => {
            let no_path = url
                .path_segments()
                .map(|mut segments| segments.all(|s| s.is_empty()))
                .unwrap_or(true);
            no_path && url.query().is_none()
        }
        Err(_) => false,
    }
}

/// Classify an already-fetched page. Pure; the ordering here is the contract.
pub fn classify_page(
    page: &FetchedPage,
    title: Option<&str>,
    matcher: &DeadPageMatcher,
) -> LivenessVerdict {
    if page.status >= 400 {
        return LivenessVerdict::dead(VerdictReason::HttpStatus(page.status));
    }

    if is_bare_domain(&page.final_url) {
        return LivenessVerdict::dead(VerdictReason::RedirectedToHomepage);
    }

    let body_lower = page.body.to_lowercase();

    if let Some(phrase) = matcher.matched_phrase(&body_lower) {
        return LivenessVerdict::dead(VerdictReason::DeadPhrase(phrase.to_string()));
    }

    if let Some(title) = title {
        let tokens = title_tokens(title);
        // a title with no usable tokens is inconclusive, not dead
        if !tokens.is_empty() && !tokens.iter().any(|t| body_lower.contains(t.as_str())) {
            return LivenessVerdict::dead(VerdictReason::TitleMismatch);
        }
    }

    LivenessVerdict::live()
}

/// Fetch a URL once and classify it. A transport failure is itself a dead
/// verdict carrying the cause, never a pipeline error.
#[instrument(level = "debug", skip(fetcher, matcher, title))]
pub async fn classify<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    title: Option<&str>,
    matcher: &DeadPageMatcher,
) -> LivenessVerdict {
    match fetcher.fetch(url).await {
        Ok(page) => classify_page(&page, title, matcher),
        Err(e) => LivenessVerdict::dead(VerdictReason::ConnectionError(e.to_string())),
    }
}
