//! Masonry layout: column math, the streaming engine and layout snapshots.

pub mod columns;
pub mod engine;
pub mod snapshot;

pub use columns::{card_width, column_count, column_x, ColumnState};
pub use engine::{Card, CardId, MasonryEngine, Point};
pub use snapshot::{CardSnapshot, LayoutSnapshot};
