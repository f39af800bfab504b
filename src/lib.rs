//! Masonry Flow
//!
//! A streaming masonry layout engine for endless, auto-scrolling card feeds,
//! plus a swipe card stack for browsing the same content one card at a time.
//!
//! # Features
//!
//! - **Greedy column balancing**: each new card goes to the shortest column
//! - **Bounded live set**: cards are created ahead of the viewport and evicted
//!   once they fall behind the retention margin
//! - **Host agnostic**: rendering happens behind the [`CardSurface`] trait;
//!   timing and viewport events are fed in explicitly
//! - **Deterministic**: all randomness goes through an injectable
//!   [`RandomSource`]
//!
//! # Example
//!
//! ```
//! use masonry_flow::{
//!     ContentItem, DataSource, FixedHeightSurface, FlowConfig, MasonryEngine, SeededRandom, Size,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = DataSource::from_items(vec![
//!     ContentItem::new("Wages", "Courier", "Paid per drop, not per hour.", "Interview"),
//! ]);
//! let mut engine = MasonryEngine::initialize(
//!     Size { width: 1280.0, height: 720.0 },
//!     FlowConfig::default(),
//!     data,
//!     FixedHeightSurface::new(vec![120.0, 180.0]),
//!     SeededRandom::new(7),
//! )?;
//! engine.tick(1.0);
//! assert_eq!(engine.column_count(), 4);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod content;
pub mod error;
pub mod events;
pub mod layout;
pub mod random;
pub mod stack;
pub mod surface;

pub use content::{CardDetail, ContentFilter, ContentItem, DataSource};
pub use error::{Error, Result};
pub use events::{EventBus, EventKind, FlowController, ResizeDebouncer, Subscription, ViewportEvent};
pub use layout::{Card, CardId, LayoutSnapshot, MasonryEngine};
pub use random::{RandomSource, SeededRandom};
pub use stack::{CardStack, GestureOutcome, StackConfig};
pub use surface::{
    CardSurface, DetailPresenter, FixedHeightSurface, NoopPresenter, Placement, TextMetricsSurface,
};

/// Container dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Containers at least `min_width` wide get `columns` columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: f64,
    pub columns: usize,
}

/// Configuration for the masonry engine
///
/// All thresholds are tunable. The defaults reproduce the feed as it ships:
/// - 12px gaps, 0.32px of scroll per frame
/// - the initial fill covers twice the viewport, later passes keep one and a
///   half viewports of cards ahead
/// - cards are kept alive until they are 200px above the viewport
///
/// # Examples
///
/// ```
/// let cfg = masonry_flow::FlowConfig::default();
/// assert_eq!(cfg.retention_margin, 200.0);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Scroll distance per animation frame (px)
    pub speed: f64,
    /// Gap between columns and between stacked cards (px)
    pub gap: f64,
    /// Extra space added below every card (px)
    pub height_buffer: f64,
    /// Floor applied to measured card heights (px)
    pub min_card_height: f64,
    /// Floor applied to the computed card width (px)
    pub min_card_width: f64,
    /// Initial fill target, as a multiple of the viewport height
    pub initial_fill_factor: f64,
    /// Look-ahead kept below the viewport while running, in viewport heights
    pub extend_factor: f64,
    /// Distance above the viewport before a card is evicted (px)
    pub retention_margin: f64,
    /// Column breakpoints; widths below every entry get one column
    pub breakpoints: Vec<Breakpoint>,
    /// Quiet period before a burst of resizes is applied (ms)
    pub resize_quiet_period_ms: u64,
    /// Nominal frame duration used to convert elapsed time to frames (ms)
    pub frame_interval_ms: f64,
    /// Upper bound on cards created by a single fill pass
    pub max_cards_per_pass: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            speed: 0.32,
            gap: 12.0,
            height_buffer: 6.0,
            min_card_height: 60.0,
            min_card_width: 60.0,
            initial_fill_factor: 2.0,
            extend_factor: 1.5,
            retention_margin: 200.0,
            breakpoints: vec![
                Breakpoint { min_width: 1500.0, columns: 5 },
                Breakpoint { min_width: 1000.0, columns: 4 },
                Breakpoint { min_width: 600.0, columns: 3 },
                Breakpoint { min_width: 400.0, columns: 2 },
            ],
            resize_quiet_period_ms: 200,
            frame_interval_ms: 1000.0 / 60.0,
            max_cards_per_pass: 1024,
        }
    }
}

impl FlowConfig {
    /// Reject values that would break the layout invariants.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("speed", self.speed),
            ("gap", self.gap),
            ("height_buffer", self.height_buffer),
            ("initial_fill_factor", self.initial_fill_factor),
            ("extend_factor", self.extend_factor),
            ("retention_margin", self.retention_margin),
            ("frame_interval_ms", self.frame_interval_ms),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        // A zero floor would let a column stall and stack cards at one y.
        if !self.min_card_height.is_finite() || self.min_card_height <= 0.0 {
            return Err(Error::ConfigError("min_card_height must be positive".into()));
        }
        if !self.min_card_width.is_finite() || self.min_card_width <= 0.0 {
            return Err(Error::ConfigError("min_card_width must be positive".into()));
        }
        if let Some(bp) = self.breakpoints.iter().find(|bp| bp.columns == 0) {
            return Err(Error::ConfigError(format!(
                "breakpoint at {}px has zero columns",
                bp.min_width
            )));
        }
        if self.max_cards_per_pass == 0 {
            return Err(Error::ConfigError("max_cards_per_pass must be at least 1".into()));
        }
        Ok(())
    }

    /// Load a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: FlowConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn resize_quiet_period(&self) -> Duration {
        Duration::from_millis(self.resize_quiet_period_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.frame_interval_ms / 1000.0)
    }
}
