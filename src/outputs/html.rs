//! HTML rendering of the newsletter page.
//!
//! Builds the final digest page from a [`DigestContext`] and writes it under
//! `public/`. Every interpolated string goes through [`html_escape`] so a
//! hostile article title cannot inject markup.

use std::error::Error;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::digest::{CalendarDay, DayStatus, DigestContext};
use crate::models::CategoryArticles;

/// File name of the rendered newsletter.
pub const NEWSLETTER_FILE: &str = "newsletter.html";
/// The newsletter doubles as the site index.
pub const INDEX_FILE: &str = "index.html";

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_calendar(calendar_week: &[CalendarDay]) -> String {
    let mut cells = String::new();
    for day in calendar_week {
        let class = match day.status {
            DayStatus::Past => "cal-day past",
            DayStatus::Today => "cal-day today",
            DayStatus::Future => "cal-day future",
        };
        cells.push_str(&format!(
            r#"<div class="{class}"><span class="cal-name">{name}</span><span class="cal-date">{date}</span></div>"#,
            name = html_escape(day.day_name),
            date = day.date,
        ));
    }
    format!(r#"<div class="calendar">{cells}</div>"#)
}

fn render_briefing(briefing_points: &[String]) -> String {
    let mut items = String::new();
    for point in briefing_points {
        items.push_str(&format!("<li>{}</li>", html_escape(point)));
    }
    format!(r#"<ul class="briefing">{items}</ul>"#)
}

fn render_categories(categories: &[CategoryArticles]) -> String {
    let mut sections = String::new();
    for category in categories {
        let mut articles = String::new();
        if category.articles.is_empty() {
            articles.push_str(r#"<li class="no-news">전일자 기사가 없습니다.</li>"#);
        }
        for article in &category.articles {
            articles.push_str(&format!(
                r#"<li><a href="{url}" target="_blank" rel="noopener">{title}</a></li>"#,
                url = html_escape(&article.url),
                title = html_escape(&article.title),
            ));
        }
        sections.push_str(&format!(
            r#"<section class="category"><h2>{label}</h2><ul>{articles}</ul></section>"#,
            label = html_escape(&category.label),
        ));
    }
    sections
}

/// Render the full newsletter page.
pub fn render_digest(ctx: &DigestContext) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{headline} — 데일리 다이제스트</title>
<style>
body {{ font-family: 'Apple SD Gothic Neo', 'Malgun Gothic', sans-serif; max-width: 680px; margin: 0 auto; padding: 24px; color: #222; }}
header {{ border-bottom: 2px solid #222; padding-bottom: 12px; margin-bottom: 20px; }}
.dateline {{ color: #888; font-size: 13px; }}
h1 {{ font-size: 24px; margin: 8px 0; }}
.calendar {{ display: flex; gap: 8px; margin: 16px 0; }}
.cal-day {{ flex: 1; text-align: center; padding: 8px 0; border-radius: 8px; background: #f4f4f4; font-size: 13px; }}
.cal-day.today {{ background: #222; color: #fff; font-weight: 700; }}
.cal-day.past {{ color: #aaa; }}
.cal-name {{ display: block; }}
.briefing {{ background: #f9f7f2; border-radius: 8px; padding: 16px 16px 16px 32px; }}
.briefing li {{ margin: 6px 0; }}
.category h2 {{ font-size: 17px; border-left: 4px solid #222; padding-left: 8px; }}
.category ul {{ list-style: none; padding: 0; }}
.category li {{ margin: 8px 0; }}
.category a {{ color: #1a56a0; text-decoration: none; }}
.no-news {{ color: #999; }}
.insight {{ background: #eef4fb; border-radius: 8px; padding: 16px; margin-top: 24px; }}
.insight h2 {{ margin-top: 0; font-size: 15px; }}
footer {{ margin-top: 32px; color: #aaa; font-size: 12px; text-align: center; }}
</style>
</head>
<body>
<header>
<p class="dateline">{today} · 전일({yesterday}) 뉴스</p>
<h1>{headline}</h1>
</header>
{calendar}
<h2>📋 시장 브리핑</h2>
{briefing}
{categories}
<div class="insight">
<h2>💡 오늘의 인사이트</h2>
<p>{insight}</p>
</div>
<footer>매일 아침 전일자 뉴스를 정리해 보내드립니다.</footer>
</body>
</html>
"#,
        headline = html_escape(&ctx.headline),
        today = html_escape(&ctx.today_display),
        yesterday = html_escape(&ctx.yesterday_display),
        calendar = render_calendar(&ctx.calendar_week),
        briefing = render_briefing(&ctx.briefing_points),
        categories = render_categories(&ctx.categories),
        insight = html_escape(&ctx.today_insight),
    )
}

/// Write the rendered page as the newsletter and the site index.
#[instrument(level = "info", skip_all, fields(public_dir = %public_dir.display()))]
pub async fn write_digest(html: &str, public_dir: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(public_dir).await?;

    let newsletter_path = public_dir.join(NEWSLETTER_FILE);
    fs::write(&newsletter_path, html).await?;
    fs::copy(&newsletter_path, public_dir.join(INDEX_FILE)).await?;

    info!(path = %newsletter_path.display(), bytes = html.len(), "Wrote newsletter");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::calendar_week;
    use crate::models::Article;
    use chrono::NaiveDate;

    fn context() -> DigestContext {
        DigestContext {
            today_display: "2026년 02월 17일 화요일".to_string(),
            yesterday_display: "2026.02.16".to_string(),
            calendar_week: calendar_week(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap()),
            headline: "코스피 상승 마감".to_string(),
            briefing_points: vec!["코스피 상승 마감".to_string()],
            today_insight: "시장은 반도체 중심으로 올랐다.".to_string(),
            categories: vec![CategoryArticles {
                label: "시황".to_string(),
                articles: vec![Article {
                    title: "코스피 상승 마감".to_string(),
                    url: "https://news.naver.com/a/1".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn test_render_contains_all_sections() {
        let html = render_digest(&context());
        assert!(html.contains("코스피 상승 마감"));
        assert!(html.contains("2026.02.16"));
        assert!(html.contains("https://news.naver.com/a/1"));
        assert!(html.contains("시장은 반도체 중심으로 올랐다."));
        assert!(html.contains(r#"<div class="cal-day today">"#));
    }

    #[test]
    fn test_titles_are_escaped() {
        let mut ctx = context();
        ctx.headline = r#"<script>alert("x")</script>"#.to_string();
        ctx.categories[0].articles[0].title = "1 < 2 & \"quotes\"".to_string();

        let html = render_digest(&ctx);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("1 &lt; 2 &amp; &quot;quotes&quot;"));
    }

    #[test]
    fn test_empty_category_renders_placeholder() {
        let mut ctx = context();
        ctx.categories[0].articles.clear();
        let html = render_digest(&ctx);
        assert!(html.contains("전일자 기사가 없습니다."));
    }

    #[tokio::test]
    async fn test_write_digest_creates_newsletter_and_index() {
        let tmp = tempfile::tempdir().unwrap();
        let public_dir = tmp.path().join("public");

        write_digest("<html></html>", &public_dir).await.unwrap();

        let newsletter = tokio::fs::read_to_string(public_dir.join(NEWSLETTER_FILE))
            .await
            .unwrap();
        let index = tokio::fs::read_to_string(public_dir.join(INDEX_FILE))
            .await
            .unwrap();
        assert_eq!(newsletter, "<html></html>");
        assert_eq!(index, newsletter);
    }
}
