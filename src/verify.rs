//! Runs the liveness classifier over every collected article.
//!
//! The verifier only ever removes: survivors keep their relative order and
//! their exact title/url values, and the set's date passes through
//! untouched. Links are checked one at a time.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::liveness::{DeadPageMatcher, PageFetcher, classify};
use crate::models::{Article, ArticleSet, CategoryArticles};

/// Classify every article and keep the live ones.
#[instrument(level = "info", skip_all, fields(date = %set.date))]
pub async fn verify<F: PageFetcher>(
    set: ArticleSet,
    fetcher: &F,
    matcher: &DeadPageMatcher,
) -> ArticleSet {
    let mut total_before = 0usize;
    let mut total_after = 0usize;
    let mut categories = Vec::with_capacity(set.categories.len());

    for category in set.categories {
        let before = category.articles.len();
        total_before += before;

        let survivors: Vec<Article> = stream::iter(category.articles)
            .filter_map(|article| async move {
                let verdict = classify(fetcher, &article.url, Some(&article.title), matcher).await;
                if verdict.is_dead {
                    warn!(url = %article.url, reason = %verdict.reason, "Dead link removed");
                    None
                } else {
                    debug!(url = %article.url, "Link OK");
                    Some(article)
                }
            })
            .collect()
            .await;

        total_after += survivors.len();
        info!(label = %category.label, before, after = survivors.len(), "Verified category");
        categories.push(CategoryArticles {
            label: category.label,
            articles: survivors,
        });
    }

    info!(
        total_before,
        total_after,
        removed = total_before - total_after,
        "Verification complete"
    );

    ArticleSet {
        date: set.date,
        categories,
    }
}
