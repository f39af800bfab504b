//! Container contract between the layout engine and whatever renders cards.
//!
//! The engine never assumes a particular representation. A surface only has
//! to append opaque card handles, report their rendered height after
//! insertion, remove them, and translate the whole collection.

use std::collections::HashMap;

use crate::content::{CardDetail, ContentItem};
use crate::layout::CardId;

/// Where a new card goes, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

pub trait CardSurface {
    /// Opaque renderable handle owned by the engine while the card is live.
    type Handle;

    /// Insert a card. The host routes clicks on it back to
    /// `MasonryEngine::select_card(id)`.
    fn append(&mut self, id: CardId, content: &ContentItem, placement: Placement) -> Self::Handle;

    /// Rendered height of an inserted card. May be zero for detached nodes.
    fn measure(&self, handle: &Self::Handle) -> f64;

    fn remove(&mut self, handle: Self::Handle);

    /// Apply a single vertical translation to the whole collection.
    fn translate(&mut self, dy: f64);
}

/// Receives full content when a card is selected.
pub trait DetailPresenter {
    fn present(&self, detail: &CardDetail);
}

/// Presenter that ignores selections
pub struct NoopPresenter;

impl DetailPresenter for NoopPresenter {
    fn present(&self, _detail: &CardDetail) {}
}

/// Surface whose cards measure to a repeating list of heights.
///
/// Useful for deterministic tests and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct FixedHeightSurface {
    heights: Vec<f64>,
    next: usize,
    live: HashMap<usize, Placement>,
    translation: f64,
}

impl FixedHeightSurface {
    /// An empty `heights` list makes every card measure zero.
    pub fn new(heights: Vec<f64>) -> Self {
        Self {
            heights,
            ..Default::default()
        }
    }

    /// Number of cards currently attached.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn translation(&self) -> f64 {
        self.translation
    }

    pub fn placement(&self, handle: usize) -> Option<Placement> {
        self.live.get(&handle).copied()
    }
}

impl CardSurface for FixedHeightSurface {
    type Handle = usize;

    fn append(&mut self, _id: CardId, _content: &ContentItem, placement: Placement) -> usize {
        let handle = self.next;
        self.next += 1;
        self.live.insert(handle, placement);
        handle
    }

    fn measure(&self, handle: &usize) -> f64 {
        if self.heights.is_empty() {
            return 0.0;
        }
        self.heights[handle % self.heights.len()]
    }

    fn remove(&mut self, handle: usize) {
        self.live.remove(&handle);
    }

    fn translate(&mut self, dy: f64) {
        self.translation = dy;
    }
}

/// Surface that estimates card height by word-wrapping the text at a fixed
/// glyph width.
#[derive(Debug, Clone)]
pub struct TextMetricsSurface {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
    heights: HashMap<CardId, f64>,
    translation: f64,
}

impl Default for TextMetricsSurface {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 22.0,
            padding: 16.0,
            heights: HashMap::new(),
            translation: 0.0,
        }
    }
}

impl TextMetricsSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.heights.len()
    }

    pub fn translation(&self) -> f64 {
        self.translation
    }

    fn estimate(&self, content: &ContentItem, width: f64) -> f64 {
        let content_w = width - self.padding * 2.0;
        let chars_per_line = if content_w >= self.char_width {
            (content_w / self.char_width) as usize
        } else {
            1
        };
        let lines = wrap_line_count(&content.text, chars_per_line);
        // one line for the category label
        self.padding * 2.0 + (lines + 1) as f64 * self.line_height
    }
}

/// Greedy word wrap; returns the number of lines (at least one).
fn wrap_line_count(text: &str, chars_per_line: usize) -> usize {
    let mut lines = 0usize;
    let mut cur = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if cur > 0 && cur + len + 1 > chars_per_line {
            lines += 1;
            cur = len;
        } else {
            if cur > 0 {
                cur += 1;
            }
            cur += len;
        }
    }
    if cur > 0 {
        lines += 1;
    }
    lines.max(1)
}

impl CardSurface for TextMetricsSurface {
    type Handle = CardId;

    fn append(&mut self, id: CardId, content: &ContentItem, placement: Placement) -> CardId {
        let h = self.estimate(content, placement.width);
        self.heights.insert(id, h);
        id
    }

    fn measure(&self, handle: &CardId) -> f64 {
        self.heights.get(handle).copied().unwrap_or(0.0)
    }

    fn remove(&mut self, handle: CardId) {
        self.heights.remove(&handle);
    }

    fn translate(&mut self, dy: f64) {
        self.translation = dy;
    }
}
