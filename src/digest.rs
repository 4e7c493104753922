//! Digest context assembly.
//!
//! Chooses what the newsletter template gets to see: the headline, the
//! briefing bullets, the Mon–Fri calendar strip, and the day's insight.
//! Rendering itself lives in `outputs::html`.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::instrument;

use crate::insight::InsightSource;
use crate::models::{ArticleSet, CategoryArticles};

pub const HEADLINE_MAX_CHARS: usize = 30;
const FALLBACK_HEADLINE: &str = "전일자 주요 뉴스 요약";
const FALLBACK_BRIEFING: &str = "전일자 주요 뉴스를 확인해 주세요.";
const MAX_BRIEFING_POINTS: usize = 4;
const WEEKDAY_KR: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// Where one calendar cell sits relative to the render date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Past,
    Today,
    Future,
}

/// One cell of the Mon–Fri calendar strip.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub day_name: &'static str,
    pub date: u32,
    pub is_today: bool,
    pub status: DayStatus,
}

/// Everything the newsletter template consumes.
#[derive(Debug, Serialize)]
pub struct DigestContext {
    pub today_display: String,
    pub yesterday_display: String,
    pub calendar_week: Vec<CalendarDay>,
    pub headline: String,
    pub briefing_points: Vec<String>,
    pub today_insight: String,
    pub categories: Vec<CategoryArticles>,
}

/// First article title across categories in declared order, truncated to
/// [`HEADLINE_MAX_CHARS`] characters with an ellipsis.
pub fn build_headline(categories: &[CategoryArticles]) -> String {
    for category in categories {
        if let Some(article) = category.articles.first() {
            let title = &article.title;
            if title.chars().count() > HEADLINE_MAX_CHARS {
                let truncated: String = title.chars().take(HEADLINE_MAX_CHARS).collect();
                return format!("{truncated}…");
            }
            return title.clone();
        }
    }
    FALLBACK_HEADLINE.to_string()
}

/// First article title from each non-empty category, capped at
/// [`MAX_BRIEFING_POINTS`].
pub fn build_briefing_points(categories: &[CategoryArticles]) -> Vec<String> {
    let mut points: Vec<String> = categories
        .iter()
        .filter_map(|category| category.articles.first())
        .map(|article| article.title.clone())
        .collect();

    if points.is_empty() {
        points.push(FALLBACK_BRIEFING.to_string());
    }
    points.truncate(MAX_BRIEFING_POINTS);
    points
}

/// Mon–Fri of the week containing `today`, each cell tagged relative to it.
pub fn calendar_week(today: NaiveDate) -> Vec<CalendarDay> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

    (0..5)
        .map(|offset| {
            let day = monday + Duration::days(offset);
            let status = if day < today {
                DayStatus::Past
            } else if day == today {
                DayStatus::Today
            } else {
                DayStatus::Future
            };
            CalendarDay {
                day_name: WEEKDAY_KR[offset as usize],
                date: day.day(),
                is_today: day == today,
                status,
            }
        })
        .collect()
}

fn today_display(today: NaiveDate) -> String {
    format!(
        "{}년 {:02}월 {:02}일 {}요일",
        today.year(),
        today.month(),
        today.day(),
        WEEKDAY_KR[today.weekday().num_days_from_monday() as usize]
    )
}

fn yesterday_display(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%Y.%m.%d").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Assemble the full template context from the verified article set.
#[instrument(level = "info", skip_all, fields(date = %set.date))]
pub async fn build_context(
    set: ArticleSet,
    today: NaiveDate,
    insight: &InsightSource,
) -> DigestContext {
    let today_insight = insight.today_insight(&set).await;

    DigestContext {
        today_display: today_display(today),
        yesterday_display: yesterday_display(&set.date),
        calendar_week: calendar_week(today),
        headline: build_headline(&set.categories),
        briefing_points: build_briefing_points(&set.categories),
        today_insight,
        categories: set.categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;

    fn category(label: &str, titles: &[&str]) -> CategoryArticles {
        CategoryArticles {
            label: label.to_string(),
            articles: titles
                .iter()
                .map(|t| Article {
                    title: t.to_string(),
                    url: format!("https://n/{t}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_headline_is_first_title_in_category_order() {
        let categories = vec![
            category("빈", &[]),
            category("시황", &["코스피 상승 마감", "외국인 순매수"]),
        ];
        assert_eq!(build_headline(&categories), "코스피 상승 마감");
    }

    #[test]
    fn test_headline_truncates_long_titles_by_characters() {
        let long = "가".repeat(45);
        let categories = vec![category("시황", &[long.as_str()])];
        let headline = build_headline(&categories);
        assert_eq!(headline.chars().count(), HEADLINE_MAX_CHARS + 1);
        assert!(headline.ends_with('…'));
    }

    #[test]
    fn test_headline_at_exactly_the_cap_is_untouched() {
        let exact = "가".repeat(HEADLINE_MAX_CHARS);
        let categories = vec![category("시황", &[exact.as_str()])];
        assert_eq!(build_headline(&categories), exact);
    }

    #[test]
    fn test_headline_fallback_when_no_articles() {
        let categories = vec![category("빈", &[]), category("더 빈", &[])];
        assert_eq!(build_headline(&categories), FALLBACK_HEADLINE);
    }

    #[test]
    fn test_briefing_points_cap_and_order() {
        let categories = vec![
            category("a", &["하나"]),
            category("b", &["둘"]),
            category("c", &[]),
            category("d", &["셋"]),
            category("e", &["넷"]),
            category("f", &["다섯"]),
        ];
        assert_eq!(build_briefing_points(&categories), vec!["하나", "둘", "셋", "넷"]);
    }

    #[test]
    fn test_briefing_points_fallback() {
        let categories = vec![category("빈", &[])];
        assert_eq!(build_briefing_points(&categories), vec![FALLBACK_BRIEFING]);
    }

    #[test]
    fn test_calendar_week_statuses_midweek() {
        // Wednesday 2026-02-18
        let today = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        let week = calendar_week(today);

        assert_eq!(week.len(), 5);
        assert_eq!(
            week.iter().map(|d| d.day_name).collect::<Vec<_>>(),
            vec!["월", "화", "수", "목", "금"]
        );
        assert_eq!(
            week.iter().map(|d| d.status).collect::<Vec<_>>(),
            vec![
                DayStatus::Past,
                DayStatus::Past,
                DayStatus::Today,
                DayStatus::Future,
                DayStatus::Future
            ]
        );
        assert_eq!(week.iter().map(|d| d.date).collect::<Vec<_>>(), vec![16, 17, 18, 19, 20]);
        assert!(week[2].is_today);
    }

    #[test]
    fn test_calendar_week_on_monday_has_no_past() {
        let monday = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        let week = calendar_week(monday);
        assert_eq!(week[0].status, DayStatus::Today);
        assert!(week[1..].iter().all(|d| d.status == DayStatus::Future));
    }

    #[test]
    fn test_calendar_week_on_sunday_is_all_past() {
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 22).unwrap();
        let week = calendar_week(sunday);
        assert!(week.iter().all(|d| d.status == DayStatus::Past));
    }

    #[test]
    fn test_display_strings() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        assert_eq!(today_display(today), "2026년 02월 17일 화요일");
        assert_eq!(yesterday_display("2026-02-16"), "2026.02.16");
        // unparseable dates pass through rather than failing the render
        assert_eq!(yesterday_display("sometime"), "sometime");
    }

    #[tokio::test]
    async fn test_build_context_end_to_end_with_fallback_insight() {
        let set = ArticleSet {
            date: "2026-02-16".to_string(),
            categories: vec![
                category("시황", &["코스피 상승 마감", "외국인 순매수", "채권 금리 하락"]),
                category("반도체", &[]),
            ],
        };
        let insight = InsightSource::from_credentials(None, "gpt-4o-mini");
        let today = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();

        let ctx = build_context(set, today, &insight).await;
        assert_eq!(ctx.headline, "코스피 상승 마감");
        assert_eq!(ctx.briefing_points, vec!["코스피 상승 마감"]);
        assert_eq!(ctx.yesterday_display, "2026.02.16");
        assert_eq!(ctx.calendar_week.len(), 5);
        assert!(ctx.today_insight.contains("코스피 상승 마감"));
        assert_eq!(ctx.categories.len(), 2);
    }
}
