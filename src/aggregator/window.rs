// Fixed-capacity FIFO window of labeled points

use std::collections::VecDeque;

use crate::models::{ChartBounds, SeriesPoint, SeriesView};

/// Points kept per trend chart.
pub const WINDOW_CAPACITY: usize = 30;

/// Margin used when every point in the window has the same value.
const FLAT_MARGIN: f64 = 10.0;

/// Rolling buffer of (label, value) points in arrival order.
/// Labels and values live in one queue, so they cannot fall out of alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSeries<T> {
    points: VecDeque<SeriesPoint<T>>,
}

impl<T> Default for WindowedSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WindowedSeries<T> {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Pushes to the tail and evicts from the head until the window is back at capacity.
    pub fn append(&mut self, point: SeriesPoint<T>) {
        self.points.push_back(point);
        while self.points.len() > WINDOW_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn current(&self) -> &VecDeque<SeriesPoint<T>> {
        &self.points
    }

    pub fn last(&self) -> Option<&SeriesPoint<T>> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Values that can be plotted on a numeric axis.
pub trait ChartValue: Copy {
    fn to_axis(self) -> f64;
}

impl ChartValue for u64 {
    fn to_axis(self) -> f64 {
        self as f64
    }
}

impl ChartValue for f64 {
    fn to_axis(self) -> f64 {
        self
    }
}

impl<T: ChartValue> WindowedSeries<T> {
    /// Y-axis range for the chart; `None` for an empty window.
    pub fn bounds(&self) -> Option<ChartBounds> {
        let mut values = self.points.iter().map(|p| p.value.to_axis());
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let spread = max - min;
        let margin = if spread > 0.0 { spread * 0.1 } else { FLAT_MARGIN };
        Some(ChartBounds {
            min,
            max,
            padded_max: max + margin,
        })
    }

    pub fn to_view(&self) -> SeriesView<T> {
        SeriesView {
            labels: self.points.iter().map(|p| p.label.clone()).collect(),
            values: self.points.iter().map(|p| p.value).collect(),
            bounds: self.bounds(),
        }
    }
}
