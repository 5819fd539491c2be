//! Terminal tables for fetched articles and reports

use comfy_table::{Cell, ContentArrangement, Table, presets};
use pulse_news::{AnalysisReport, Article};

const TITLE_WIDTH: usize = 70;

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(Cell::new));
    table
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

pub fn articles_table(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "No news found for the selected category/language.".to_string();
    }
    let mut table = table(&["Title", "Source", "Published", "Category"]);
    for article in articles {
        table.add_row(vec![
            shorten(&article.title, TITLE_WIDTH),
            article.source.clone().unwrap_or_default(),
            article.published_at.clone().unwrap_or_default(),
            article.category.clone().unwrap_or_default(),
        ]);
    }
    format!("{} articles\n{table}", articles.len())
}

pub fn report_tables(report: &AnalysisReport) -> String {
    if report.is_empty() {
        return "No news found for the selected category/language.".to_string();
    }

    let mut articles = table(&["Title", "Sentiment", "Topic", "Entities"]);
    for a in &report.articles {
        let entities = a
            .entities
            .iter()
            .map(|e| format!("{} ({})", e.text, e.label))
            .collect::<Vec<_>>()
            .join(", ");
        articles.add_row(vec![
            shorten(&a.article.title, TITLE_WIDTH),
            a.sentiment.to_string(),
            a.topic_label.clone(),
            entities,
        ]);
    }

    let mut topics = table(&["Topic", "Articles", "Top terms"]);
    for topic in &report.topics {
        let terms = topic
            .terms
            .iter()
            .take(5)
            .map(|(term, _)| term.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        topics.add_row(vec![topic.label.clone(), topic.size.to_string(), terms]);
    }

    let mut out = format!("{articles}\n\n{topics}\n");

    let spikes: Vec<_> = report.spikes().collect();
    if spikes.is_empty() {
        out.push_str("\nNo trend spikes detected.\n");
    } else {
        let mut trends = table(&["Topic", "Bucket", "Articles", "Rolling mean"]);
        for point in spikes {
            trends.add_row(vec![
                point.group.clone(),
                point.bucket.format("%Y-%m-%d %H:%M").to_string(),
                point.article_count.to_string(),
                format!("{:.2}", point.rolling_count),
            ]);
        }
        out.push_str(&format!("\nTrend spikes\n{trends}\n"));
    }

    let matrix = &report.category_correlation;
    if matrix.labels.len() > 1 {
        let mut headers = vec![""];
        headers.extend(matrix.labels.iter().map(String::as_str));
        let mut corr = table(&headers);
        for (label, row) in matrix.labels.iter().zip(&matrix.values) {
            let mut cells = vec![label.clone()];
            cells.extend(
                row.iter()
                    .map(|v| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))),
            );
            corr.add_row(cells);
        }
        out.push_str(&format!("\nCategory correlation\n{corr}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_news::NewsProvider;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_articles_table() {
        let mut article = Article::new("Rupee gains", NewsProvider::NewsData);
        article.source = Some("Mint".to_string());
        let out = articles_table(&[article]);
        assert!(out.starts_with("1 articles"));
        assert!(out.contains("Rupee gains"));
        assert!(out.contains("Mint"));

        assert!(articles_table(&[]).starts_with("No news found"));
    }

    #[test]
    fn test_empty_report() {
        assert!(report_tables(&AnalysisReport::empty()).starts_with("No news found"));
    }
}
