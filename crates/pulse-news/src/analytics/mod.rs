//! Trend detection, cross-category correlation and chart aggregates

pub mod correlation;
pub mod summary;
pub mod trends;

pub use correlation::{CorrelationMatrix, CorrelationMetric, compute_category_correlation};
pub use summary::{LabelCount, ReportSummary, TimelinePoint};
pub use trends::{
    DateBucket, TrendDimension, TrendInput, TrendOptions, TrendPoint, detect_trends,
    parse_published_at,
};
