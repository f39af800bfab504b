//! Column count, card width and the per-column height accumulators.

use crate::Breakpoint;

/// Column count for a container width: the widest breakpoint whose
/// `min_width` the container reaches, or one column.
pub fn column_count(container_width: f64, breakpoints: &[Breakpoint]) -> usize {
    breakpoints
        .iter()
        .filter(|bp| container_width >= bp.min_width)
        .max_by(|a, b| a.min_width.total_cmp(&b.min_width))
        .map(|bp| bp.columns.max(1))
        .unwrap_or(1)
}

/// `(width - (columns + 1) * gap) / columns`, clamped to `min_width`.
pub fn card_width(container_width: f64, columns: usize, gap: f64, min_width: f64) -> f64 {
    let columns = columns.max(1) as f64;
    let w = (container_width - (columns + 1.0) * gap) / columns;
    if w.is_finite() && w >= min_width {
        w
    } else {
        min_width
    }
}

/// Left edge of a column.
pub fn column_x(column: usize, card_width: f64, gap: f64) -> f64 {
    gap + column as f64 * (card_width + gap)
}

/// Running height of every column. Only the placement path mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    heights: Vec<f64>,
}

impl ColumnState {
    pub fn new(columns: usize) -> Self {
        Self {
            heights: vec![0.0; columns.max(1)],
        }
    }

    pub fn reset(&mut self, columns: usize) {
        self.heights.clear();
        self.heights.resize(columns.max(1), 0.0);
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Index and height of the shortest column; ties go to the lowest index.
    pub fn shortest(&self) -> (usize, f64) {
        let mut best = (0, self.heights[0]);
        for (i, &h) in self.heights.iter().enumerate().skip(1) {
            if h < best.1 {
                best = (i, h);
            }
        }
        best
    }

    pub fn tallest(&self) -> f64 {
        self.heights.iter().copied().fold(f64::MIN, f64::max)
    }

    pub fn commit(&mut self, column: usize, advance: f64) {
        self.heights[column] += advance;
    }
}
