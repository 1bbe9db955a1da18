// Chart series models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<T> {
    pub label: String,
    pub value: T,
}

/// Y-axis range for a trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBounds {
    pub min: f64,
    pub max: f64,
    /// `max` plus 10% of the spread, or plus 10 when the series is flat.
    pub padded_max: f64,
}

/// Index-aligned labels and values, the shape chart widgets consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView<T> {
    pub labels: Vec<String>,
    pub values: Vec<T>,
    pub bounds: Option<ChartBounds>,
}

impl<T> Default for SeriesView<T> {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
            bounds: None,
        }
    }
}
