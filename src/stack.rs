//! Swipe card stack.
//!
//! A small window of cards fanned out with growing rotation and shrinking
//! scale. Swiping the top card away (or calling [`CardStack::next`]) moves it
//! to a history and draws a fresh card at the bottom; [`CardStack::previous`]
//! brings the last discarded card back on top.
//!
//! Unlike the masonry feed, draws here are without replacement: every item in
//! the pool is shown once before any repeats.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::content::{ContentFilter, ContentItem, DataSource};
use crate::random::{RandomSource, SeededRandom};
use crate::{Error, Result};

/// Dark backgrounds that keep white text readable.
pub const CARD_PALETTE: [&str; 20] = [
    "#2D4A3E", "#8B4513", "#4A5568", "#744210", "#553C9A", "#2C5282", "#975A16", "#285E61",
    "#702459", "#1A365D", "#22543D", "#7B341E", "#5F370E", "#3C366B", "#234E52", "#742A2A",
    "#2D3748", "#44337A", "#276749", "#9C4221",
];

const COLOR_SEED_OFFSET: u64 = 54_321;

/// Deterministic background colour for a content index.
pub fn card_color(index: usize) -> &'static str {
    let mut rng = SeededRandom::new(index as u64 + COLOR_SEED_OFFSET);
    let slot = rng.pick_index(CARD_PALETTE.len()).unwrap_or(0);
    CARD_PALETTE[slot]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub visible_cards: usize,
    /// Movement (px, per axis) before a gesture is classified
    pub deadzone: f64,
    /// Drag distance (px) beyond which a release discards the card
    pub commit_distance: f64,
    pub rotation_step_deg: f64,
    pub scale_step: f64,
    /// Degrees of rotation per px of horizontal drag
    pub drag_rotation_factor: f64,
    /// Oldest entries are dropped past this size. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            visible_cards: 5,
            deadzone: 10.0,
            commit_distance: 100.0,
            rotation_step_deg: 4.0,
            scale_step: 0.05,
            drag_rotation_factor: 0.1,
            history_limit: None,
        }
    }
}

impl StackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.visible_cards == 0 {
            return Err(Error::ConfigError("visible_cards must be at least 1".into()));
        }
        if !(self.deadzone >= 0.0) || !(self.commit_distance >= 0.0) {
            return Err(Error::ConfigError(
                "deadzone and commit_distance must be non-negative".into(),
            ));
        }
        if self.history_limit == Some(0) {
            return Err(Error::ConfigError("history_limit must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCard {
    /// Index into the stack's data source
    pub index: usize,
    pub color: &'static str,
}

impl StackCard {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            color: card_color(index),
        }
    }

    /// One-based, zero-padded display number, e.g. `"007"`.
    pub fn number(&self) -> String {
        format!("{:03}", self.index + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation_deg: f64,
    pub scale: f64,
    pub z_index: i32,
}

/// Draws pool indices without replacement, starting over once every index
/// has been used.
#[derive(Debug, Clone)]
pub struct DrawPool<R: RandomSource = SeededRandom> {
    pool: Vec<usize>,
    used: HashSet<usize>,
    rng: R,
}

impl<R: RandomSource> DrawPool<R> {
    pub fn new(pool: Vec<usize>, rng: R) -> Self {
        Self {
            pool,
            used: HashSet::new(),
            rng,
        }
    }

    /// Replace the pool and forget which indices were used.
    pub fn set_pool(&mut self, pool: Vec<usize>) {
        self.pool = pool;
        self.used.clear();
    }

    pub fn reset_used(&mut self) {
        self.used.clear();
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Pool indices not yet drawn in the current cycle.
    pub fn remaining(&self) -> usize {
        self.pool.iter().filter(|i| !self.used.contains(i)).count()
    }

    /// `None` only when the pool itself is empty.
    pub fn draw(&mut self) -> Option<usize> {
        let mut available: Vec<usize> = self
            .pool
            .iter()
            .copied()
            .filter(|i| !self.used.contains(i))
            .collect();
        if available.is_empty() {
            self.used.clear();
            available = self.pool.clone();
        }
        let slot = self.rng.pick_index(available.len())?;
        let index = available[slot];
        self.used.insert(index);
        Some(index)
    }
}

/// Gesture state for the top card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Pointer is down but has not left the deadzone yet
    Pending { start_x: f64, start_y: f64 },
    Dragging { start_x: f64, start_y: f64, dx: f64, dy: f64 },
}

/// Result of a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// No gesture in progress
    Ignored,
    /// Still inside the deadzone
    Undecided,
    /// Horizontal drag; the top card follows the pointer
    Drag { dx: f64, dy: f64 },
    /// Vertical movement: hand the gesture back to page scrolling
    PassThrough,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    None,
    Committed,
    Reverted,
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: GestureState,
    deadzone: f64,
    commit_distance: f64,
}

impl GestureTracker {
    pub fn new(deadzone: f64, commit_distance: f64) -> Self {
        Self {
            state: GestureState::Idle,
            deadzone,
            commit_distance,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.state = GestureState::Pending {
            start_x: x,
            start_y: y,
        };
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> DragUpdate {
        match self.state {
            GestureState::Idle => DragUpdate::Ignored,
            GestureState::Pending { start_x, start_y } => {
                let dx = x - start_x;
                let dy = y - start_y;
                if dx.abs() <= self.deadzone && dy.abs() <= self.deadzone {
                    return DragUpdate::Undecided;
                }
                if dx.abs() > dy.abs() {
                    self.state = GestureState::Dragging {
                        start_x,
                        start_y,
                        dx,
                        dy,
                    };
                    DragUpdate::Drag { dx, dy }
                } else {
                    self.state = GestureState::Idle;
                    DragUpdate::PassThrough
                }
            }
            GestureState::Dragging {
                start_x, start_y, ..
            } => {
                let dx = x - start_x;
                let dy = y - start_y;
                self.state = GestureState::Dragging {
                    start_x,
                    start_y,
                    dx,
                    dy,
                };
                DragUpdate::Drag { dx, dy }
            }
        }
    }

    pub fn end(&mut self) -> GestureOutcome {
        let outcome = match self.state {
            GestureState::Dragging { dx, dy, .. } => {
                if dx.hypot(dy) > self.commit_distance {
                    GestureOutcome::Committed
                } else {
                    GestureOutcome::Reverted
                }
            }
            _ => GestureOutcome::None,
        };
        self.state = GestureState::Idle;
        outcome
    }

    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

pub struct CardStack<R: RandomSource = SeededRandom> {
    config: StackConfig,
    data: DataSource,
    filter: ContentFilter,
    pool: DrawPool<R>,
    cards: VecDeque<StackCard>,
    history: Vec<StackCard>,
    gesture: GestureTracker,
}

impl<R: RandomSource> CardStack<R> {
    /// Build a stack over every item in `data` and deal the first window.
    pub fn new(data: DataSource, config: StackConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let pool = (0..data.len()).collect();
        let mut stack = Self {
            gesture: GestureTracker::new(config.deadzone, config.commit_distance),
            config,
            data,
            filter: ContentFilter::default(),
            pool: DrawPool::new(pool, rng),
            cards: VecDeque::new(),
            history: Vec::new(),
        };
        stack.reset();
        Ok(stack)
    }

    /// Clear cards, history and draw state, then deal a fresh window.
    pub fn reset(&mut self) {
        self.cards.clear();
        self.history.clear();
        self.pool.reset_used();
        self.gesture.cancel();
        let count = self.config.visible_cards.min(self.pool.len());
        for _ in 0..count {
            match self.pool.draw() {
                Some(index) => self.cards.push_back(StackCard::new(index)),
                None => break,
            }
        }
        debug!("stack dealt {} of {} pooled cards", self.cards.len(), self.pool.len());
    }

    /// Restrict the pool to items matching `filter` and re-deal.
    pub fn set_filter(&mut self, filter: ContentFilter) {
        self.pool.set_pool(filter.matching_indices(&self.data));
        self.filter = filter;
        self.reset();
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Discard the top card into history and draw a new bottom card.
    /// Returns the discarded index.
    pub fn next(&mut self) -> Option<usize> {
        let top = self.cards.pop_front()?;
        let index = top.index;
        self.history.push(top);
        if let Some(limit) = self.config.history_limit {
            if self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }
        if let Some(new_index) = self.pool.draw() {
            self.cards.push_back(StackCard::new(new_index));
        }
        self.gesture.cancel();
        Some(index)
    }

    /// Restore the most recently discarded card on top, dropping the bottom
    /// card to keep the window size. Returns the restored index.
    pub fn previous(&mut self) -> Option<usize> {
        let restored = self.history.pop()?;
        let index = restored.index;
        self.cards.pop_back();
        self.cards.push_front(restored);
        self.gesture.cancel();
        Some(index)
    }

    pub fn can_go_previous(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn top(&self) -> Option<&StackCard> {
        self.cards.front()
    }

    /// Visible cards, top first.
    pub fn cards(&self) -> impl Iterator<Item = &StackCard> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn content(&self, card: &StackCard) -> Option<&Arc<ContentItem>> {
        self.data.get(card.index)
    }

    pub fn pool(&self) -> &DrawPool<R> {
        &self.pool
    }

    /// Resting transform of the card at `position` (0 = top).
    pub fn transform_at(&self, position: usize) -> CardTransform {
        let p = position as f64;
        CardTransform {
            translate_x: 0.0,
            translate_y: 0.0,
            rotation_deg: self.config.rotation_step_deg * p,
            scale: 1.0 - self.config.scale_step * p,
            z_index: self.config.visible_cards as i32 - position as i32,
        }
    }

    /// Current transform of the top card, following the pointer while dragging.
    pub fn top_transform(&self) -> CardTransform {
        match self.gesture.state() {
            GestureState::Dragging { dx, dy, .. } => CardTransform {
                translate_x: dx,
                translate_y: dy,
                rotation_deg: dx * self.config.drag_rotation_factor,
                scale: 1.0,
                z_index: self.config.visible_cards as i32,
            },
            _ => self.transform_at(0),
        }
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    /// Start a gesture on the top card. Ignored when the stack is empty.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if self.cards.is_empty() {
            return;
        }
        self.gesture.begin(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> DragUpdate {
        self.gesture.move_to(x, y)
    }

    /// Finish the gesture; a committed swipe discards the top card.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        let outcome = self.gesture.end();
        if outcome == GestureOutcome::Committed {
            self.next();
        }
        outcome
    }
}
