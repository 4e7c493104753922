//! Article collection: per-category search, recency filtering, dedup.
//!
//! For each category the collector walks its queries in declared order,
//! filters the raw results down to articles published on the target date,
//! dedups by URL, and stops at the category's cap. A failed query is logged
//! and skipped; the category keeps whatever it already has.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use itertools::Itertools;
use scraper::Html;
use tracing::{info, instrument, warn};

use crate::config::{LinkPolicy, PipelineConfig};
use crate::models::{Article, ArticleSet, CategoryArticles, RawItem};
use crate::search::NewsSearch;

/// Wire format of the search API's `pubDate` field.
const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Decide whether an article was published on the target date.
///
/// The URL is checked first: many sites embed the canonical publish date in
/// the path, which is a more reliable signal than the API's timestamp. Only
/// when the URL carries no date does the `pubDate` field get parsed; a
/// malformed timestamp counts as non-matching, never as an error.
pub fn is_target_date(url: &str, pub_date_raw: &str, target_date: NaiveDate) -> bool {
    let compact = target_date.format("%Y%m%d").to_string();
    let dotted = target_date.format("%Y.%m.%d").to_string();
    let dashed = target_date.format("%Y-%m-%d").to_string();

    if url.contains(&compact) || url.contains(&dotted) || url.contains(&dashed) {
        return true;
    }

    match DateTime::parse_from_str(pub_date_raw.trim(), PUB_DATE_FORMAT) {
        Ok(published) => published.date_naive() == target_date,
        Err(_) => false,
    }
}

/// Strip inline markup and decode entities from an API title.
///
/// The search API highlights query terms with `<b>` tags and escapes
/// reserved characters; parsing the title as an HTML fragment handles both.
pub fn clean_title(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve a raw item to its canonical link under the configured policy.
fn canonical_link(item: &RawItem, policy: LinkPolicy, trusted_domain: &str) -> Option<String> {
    let link = match policy {
        LinkPolicy::PreferTrusted => {
            if item.link.contains(trusted_domain) {
                item.link.clone()
            } else if !item.originallink.is_empty() {
                item.originallink.clone()
            } else {
                item.link.clone()
            }
        }
        LinkPolicy::TrustedOnly => {
            if item.link.contains(trusted_domain) {
                item.link.clone()
            } else if item.originallink.contains(trusted_domain) {
                item.originallink.clone()
            } else {
                return None;
            }
        }
    };

    if link.is_empty() { None } else { Some(link) }
}

/// Collect one day's articles across all configured categories.
///
/// Categories come back in input order, each capped at its `max_articles`,
/// with no duplicate URLs inside a category.
#[instrument(level = "info", skip_all, fields(date = %target_date))]
pub async fn collect<S: NewsSearch>(
    config: &PipelineConfig,
    client: &S,
    target_date: NaiveDate,
) -> ArticleSet {
    let mut categories = Vec::with_capacity(config.categories.len());

    for category in &config.categories {
        let mut articles: Vec<Article> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        'queries: for query in &category.queries {
            if articles.len() >= category.max_articles {
                break;
            }

            let items = match client.search(query).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(%query, error = %e, "Search query failed; skipping");
                    continue;
                }
            };

            // one query can return the same link more than once
            for item in items.into_iter().unique_by(|i| i.link.clone()) {
                let title = clean_title(&item.title);
                if title.is_empty() {
                    continue;
                }

                let Some(link) =
                    canonical_link(&item, config.link_policy, &config.trusted_domain)
                else {
                    continue;
                };

                if seen_urls.contains(&link) {
                    continue;
                }

                if !is_target_date(&link, &item.pub_date, target_date) {
                    continue;
                }

                seen_urls.insert(link.clone());
                articles.push(Article { title, url: link });

                if articles.len() >= category.max_articles {
                    break 'queries;
                }
            }
        }

        info!(label = %category.label, count = articles.len(), "Collected category");
        categories.push(CategoryArticles {
            label: category.label.clone(),
            articles,
        });
    }

    ArticleSet {
        date: target_date.format("%Y-%m-%d").to_string(),
        categories,
    }
}
