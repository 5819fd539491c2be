//! Cross-category correlation of trend series

use super::trends::TrendPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Trend value compared across groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMetric {
    #[default]
    ArticleCount,
    AvgSentiment,
}

impl CorrelationMetric {
    fn value(self, point: &TrendPoint) -> f64 {
        match self {
            Self::ArticleCount => point.article_count as f64,
            Self::AvgSentiment => point.avg_sentiment,
        }
    }
}

/// Square Pearson correlation matrix over group labels
///
/// `None` marks pairs where a series is constant or too short to correlate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Correlation between two labels
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Pivot trend points to bucket × group and correlate every pair of groups
///
/// Cells holding several points are averaged; buckets where a group has no
/// point count as 0.
pub fn compute_category_correlation(
    points: &[TrendPoint],
    metric: CorrelationMetric,
) -> CorrelationMatrix {
    let labels: Vec<String> = points
        .iter()
        .map(|p| p.group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let buckets: Vec<DateTime<Utc>> = points
        .iter()
        .map(|p| p.bucket)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: BTreeMap<(usize, usize), (f64, usize)> = BTreeMap::new();
    for point in points {
        let (Ok(col), Ok(row)) = (
            labels.binary_search(&point.group),
            buckets.binary_search(&point.bucket),
        ) else {
            continue;
        };
        let cell = cells.entry((col, row)).or_insert((0.0, 0));
        cell.0 += metric.value(point);
        cell.1 += 1;
    }

    let columns: Vec<Vec<f64>> = (0..labels.len())
        .map(|col| {
            (0..buckets.len())
                .map(|row| {
                    cells
                        .get(&(col, row))
                        .map_or(0.0, |(sum, n)| sum / *n as f64)
                })
                .collect()
        })
        .collect();

    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix { labels, values }
}
