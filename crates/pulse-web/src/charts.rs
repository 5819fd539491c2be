//! Plotly figure specs built from an analysis report
//!
//! Each builder returns `None` when there is nothing to plot so the page can
//! show a placeholder instead of an empty chart.

use pulse_news::AnalysisReport;
use pulse_news::analytics::{LabelCount, TimelinePoint};
use pulse_news::CorrelationMatrix;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

const MIN_WORD_PX: f64 = 12.0;
const MAX_WORD_PX: f64 = 48.0;

/// A word in the word cloud with its font size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudWord {
    pub text: String,
    pub size: u32,
}

/// Pie chart of articles per sentiment label
pub fn sentiment_pie(counts: &[LabelCount]) -> Option<Value> {
    if counts.is_empty() {
        return None;
    }
    Some(json!({
        "data": [{
            "type": "pie",
            "labels": counts.iter().map(|c| &c.label).collect::<Vec<_>>(),
            "values": counts.iter().map(|c| c.count).collect::<Vec<_>>(),
        }],
        "layout": { "title": { "text": "Sentiment Distribution" } },
    }))
}

/// Bar chart of articles per category
pub fn category_bar(counts: &[LabelCount]) -> Option<Value> {
    if counts.is_empty() {
        return None;
    }
    Some(json!({
        "data": [{
            "type": "bar",
            "x": counts.iter().map(|c| &c.label).collect::<Vec<_>>(),
            "y": counts.iter().map(|c| c.count).collect::<Vec<_>>(),
        }],
        "layout": {
            "title": { "text": "Articles per Category" },
            "xaxis": { "title": { "text": "Category" } },
            "yaxis": { "title": { "text": "Count" } },
        },
    }))
}

/// One line per category of article counts by day
pub fn timeline(points: &[TimelinePoint]) -> Option<Value> {
    if points.is_empty() {
        return None;
    }
    let mut series: BTreeMap<&str, (Vec<String>, Vec<usize>)> = BTreeMap::new();
    for point in points {
        let (x, y) = series.entry(point.category.as_str()).or_default();
        x.push(point.date.to_string());
        y.push(point.count);
    }
    let data: Vec<Value> = series
        .into_iter()
        .map(|(category, (x, y))| {
            json!({ "type": "scatter", "mode": "lines+markers", "name": category, "x": x, "y": y })
        })
        .collect();
    Some(json!({
        "data": data,
        "layout": {
            "title": { "text": "News Timeline by Category" },
            "xaxis": { "title": { "text": "Date" } },
            "yaxis": { "title": { "text": "Count" } },
        },
    }))
}

/// Heatmap of the category correlation matrix, undefined cells left blank
pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> Option<Value> {
    if matrix.is_empty() {
        return None;
    }
    Some(json!({
        "data": [{
            "type": "heatmap",
            "x": matrix.labels,
            "y": matrix.labels,
            "z": matrix.values,
            "zmin": -1.0,
            "zmax": 1.0,
            "colorscale": "RdBu",
        }],
        "layout": { "title": { "text": "Category Correlation" } },
    }))
}

/// Scale word counts linearly onto font sizes
pub fn word_cloud(words: &[LabelCount]) -> Vec<CloudWord> {
    let max = words.iter().map(|w| w.count).max().unwrap_or(0);
    let min = words.iter().map(|w| w.count).min().unwrap_or(0);
    let spread = (max - min) as f64;

    words
        .iter()
        .map(|w| {
            let t = if spread > 0.0 {
                (w.count - min) as f64 / spread
            } else {
                1.0
            };
            CloudWord {
                text: w.label.clone(),
                size: (MIN_WORD_PX + t * (MAX_WORD_PX - MIN_WORD_PX)).round() as u32,
            }
        })
        .collect()
}

/// Every chart on the dashboard
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardCharts {
    pub sentiment: Option<Value>,
    pub categories: Option<Value>,
    pub timeline: Option<Value>,
    pub correlation: Option<Value>,
    pub words: Vec<CloudWord>,
}

impl DashboardCharts {
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            sentiment: sentiment_pie(&report.summary.sentiment),
            categories: category_bar(&report.summary.categories),
            timeline: timeline(&report.summary.timeline),
            correlation: correlation_heatmap(&report.category_correlation),
            words: word_cloud(&report.summary.top_words),
        }
    }
}

/// Serialize a figure for embedding inside a `<script>` element
pub fn script_json(figure: &Value) -> serde_json::Result<String> {
    Ok(serde_json::to_string(figure)?.replace('<', "\\u003c"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn counts(pairs: &[(&str, usize)]) -> Vec<LabelCount> {
        pairs
            .iter()
            .map(|(label, count)| LabelCount {
                label: (*label).to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn test_pie_and_bar() {
        assert!(sentiment_pie(&[]).is_none());

        let pie = sentiment_pie(&counts(&[("Positive", 3), ("Negative", 1)])).unwrap();
        assert_eq!(pie["data"][0]["type"], "pie");
        assert_eq!(pie["data"][0]["values"], json!([3, 1]));

        let bar = category_bar(&counts(&[("sports", 2)])).unwrap();
        assert_eq!(bar["data"][0]["x"], json!(["sports"]));
        assert_eq!(bar["layout"]["title"]["text"], "Articles per Category");
    }

    #[test]
    fn test_timeline_one_trace_per_category() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let points = vec![
            TimelinePoint { date: day(1), category: "sports".to_string(), count: 2 },
            TimelinePoint { date: day(1), category: "business".to_string(), count: 1 },
            TimelinePoint { date: day(2), category: "sports".to_string(), count: 4 },
        ];
        let figure = timeline(&points).unwrap();
        let data = figure["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1]["name"], "sports");
        assert_eq!(data[1]["x"], json!(["2024-05-01", "2024-05-02"]));
        assert_eq!(data[1]["y"], json!([2, 4]));
    }

    #[test]
    fn test_heatmap_keeps_missing_cells() {
        let matrix = CorrelationMatrix {
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
        };
        let figure = correlation_heatmap(&matrix).unwrap();
        assert!(figure["data"][0]["z"][0][1].is_null());
        assert!(correlation_heatmap(&CorrelationMatrix::default()).is_none());
    }

    #[test]
    fn test_word_cloud_scaling() {
        let words = word_cloud(&counts(&[("cricket", 10), ("match", 5), ("rain", 0)]));
        assert_eq!(words[0].size, 48);
        assert_eq!(words[1].size, 30);
        assert_eq!(words[2].size, 12);

        let flat = word_cloud(&counts(&[("one", 1), ("two", 1)]));
        assert!(flat.iter().all(|w| w.size == 48));
    }

    #[test]
    fn test_script_json_escapes_tags() {
        let json = script_json(&json!({ "title": "</script><b>" })).unwrap();
        assert!(!json.contains('<'));
    }
}
