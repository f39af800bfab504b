//! Streaming masonry engine.
//!
//! Keeps an endless, upward-scrolling feed of cards balanced across columns.
//! Cards are created on demand at the bottom and evicted once they leave the
//! retained window above the viewport, so the live card count stays bounded
//! however long the feed runs.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::content::{CardDetail, ContentItem, DataSource};
use crate::layout::columns::{card_width, column_count, column_x, ColumnState};
use crate::layout::snapshot::{CardSnapshot, LayoutSnapshot};
use crate::random::{RandomSource, SeededRandom};
use crate::surface::{CardSurface, DetailPresenter, Placement};
use crate::{FlowConfig, Result, Size};

type OnSelectHandler = Arc<dyn Fn(&CardDetail) + Send + Sync>;

/// Engine-assigned card identifier, unique for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A placed instance of a content item.
#[derive(Debug, Clone)]
pub struct Card<H> {
    pub id: CardId,
    pub content: Arc<ContentItem>,
    pub column: usize,
    pub position: Point,
    /// Measured height, floored to `min_card_height`
    pub height: f64,
    pub created_at_offset: f64,
    handle: H,
}

impl<H> Card<H> {
    pub fn bottom(&self) -> f64 {
        self.position.y + self.height
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }
}

pub struct MasonryEngine<S: CardSurface, R: RandomSource = SeededRandom> {
    config: FlowConfig,
    container: Size,
    data: DataSource,
    surface: S,
    rng: R,
    columns: ColumnState,
    card_width: f64,
    virtual_offset: f64,
    cards: Vec<Card<S::Handle>>,
    next_id: u64,
    running: bool,
    on_select: Vec<OnSelectHandler>,
    presenter: Option<Box<dyn DetailPresenter>>,
    warned_empty: bool,
}

impl<S: CardSurface, R: RandomSource> MasonryEngine<S, R> {
    /// Validate the configuration, lay out the initial screenful and start
    /// running.
    ///
    /// The initial fill stops once the shortest column is taller than
    /// `initial_fill_factor * container.height`.
    pub fn initialize(
        container: Size,
        config: FlowConfig,
        data: DataSource,
        surface: S,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        let columns = column_count(container.width, &config.breakpoints);
        let mut engine = Self {
            card_width: card_width(container.width, columns, config.gap, config.min_card_width),
            columns: ColumnState::new(columns),
            config,
            container,
            data,
            surface,
            rng,
            virtual_offset: 0.0,
            cards: Vec::new(),
            next_id: 0,
            running: false,
            on_select: Vec::new(),
            presenter: None,
            warned_empty: false,
        };
        engine.build_initial_layout();
        engine.running = true;
        Ok(engine)
    }

    /// Attach the detail view that receives selections.
    pub fn with_presenter(mut self, presenter: Box<dyn DetailPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Register an extra callback invoked on every selection.
    pub fn on_select<F>(&mut self, cb: F)
    where
        F: Fn(&CardDetail) + Send + Sync + 'static,
    {
        self.on_select.push(Arc::new(cb));
    }

    pub fn clear_on_select(&mut self) {
        self.on_select.clear();
    }

    /// Fill forward until every column reaches the initial fill target.
    pub fn build_initial_layout(&mut self) {
        let target = self.config.initial_fill_factor * self.container.height;
        let mut created = 0usize;
        while self.columns.shortest().1 < target && created < self.config.max_cards_per_pass {
            if self.create_next_card().is_none() {
                break;
            }
            created += 1;
        }
        debug!(
            "initial layout: {} cards over {} columns (card width {:.1})",
            created,
            self.columns.len(),
            self.card_width
        );
    }

    /// Advance the feed by `frames` animation frames.
    ///
    /// Extends forward before evicting so the feed never shows a gap.
    /// Does nothing while paused.
    pub fn tick(&mut self, frames: f64) {
        if !self.running {
            return;
        }
        let frames = if frames.is_finite() && frames > 0.0 {
            frames
        } else {
            0.0
        };
        self.virtual_offset += self.config.speed * frames;
        self.surface.translate(-self.virtual_offset);

        let added = self.extend_forward();
        let removed = self.evict_behind();
        if added > 0 || removed > 0 {
            trace!(
                "tick @{:.2}: +{} -{} ({} live)",
                self.virtual_offset,
                added,
                removed,
                self.cards.len()
            );
        }
    }

    fn extend_forward(&mut self) -> usize {
        let lookahead = self.config.extend_factor * self.container.height;
        let mut created = 0usize;
        while self.columns.tallest() - self.virtual_offset < lookahead
            && created < self.config.max_cards_per_pass
        {
            if self.create_next_card().is_none() {
                break;
            }
            created += 1;
        }
        created
    }

    fn evict_behind(&mut self) -> usize {
        let threshold = self.virtual_offset - self.config.retention_margin;
        if !self.cards.iter().any(|c| c.bottom() < threshold) {
            return 0;
        }
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.cards)
            .into_iter()
            .partition(|c| c.bottom() < threshold);
        self.cards = kept;
        let removed = gone.len();
        for card in gone {
            self.surface.remove(card.handle);
        }
        removed
    }

    /// Sample one item, place it in the shortest column and commit its
    /// measured height. Returns `None` when the data source is empty.
    pub fn create_next_card(&mut self) -> Option<CardId> {
        let content = match self.data.sample(&mut self.rng) {
            Some(content) => content,
            None => {
                if !self.warned_empty {
                    warn!("data source is empty; skipping card creation");
                    self.warned_empty = true;
                }
                return None;
            }
        };

        let (column, y) = self.columns.shortest();
        let x = column_x(column, self.card_width, self.config.gap);
        let id = CardId(self.next_id);
        self.next_id += 1;

        let placement = Placement {
            x,
            y,
            width: self.card_width,
        };
        let handle = self.surface.append(id, &content, placement);
        let measured = self.surface.measure(&handle);
        let height = if measured.is_finite() {
            measured.max(self.config.min_card_height)
        } else {
            self.config.min_card_height
        };
        self.columns
            .commit(column, height + self.config.gap + self.config.height_buffer);

        trace!("card {:?} -> column {} at y={:.1} h={:.1}", id, column, y, height);
        self.cards.push(Card {
            id,
            content,
            column,
            position: Point { x, y },
            height,
            created_at_offset: self.virtual_offset,
            handle,
        });
        Some(id)
    }

    /// Clear every card and recompute columns for `container`, leaving the
    /// engine empty with zeroed offsets. `handle_resize` rebuilds afterwards.
    pub fn reset_layout(&mut self, container: Size) {
        for card in self.cards.drain(..) {
            self.surface.remove(card.handle);
        }
        self.container = container;
        let columns = column_count(container.width, &self.config.breakpoints);
        self.card_width = card_width(
            container.width,
            columns,
            self.config.gap,
            self.config.min_card_width,
        );
        self.columns.reset(columns);
        self.virtual_offset = 0.0;
        self.surface.translate(0.0);
        debug!(
            "layout reset for {:.0}x{:.0}: {} columns",
            container.width, container.height, columns
        );
    }

    /// Hard reset and rebuild for a new container size. Running state is kept.
    pub fn handle_resize(&mut self, container: Size) {
        self.reset_layout(container);
        self.build_initial_layout();
    }

    pub fn pause(&mut self) {
        if self.running {
            debug!("paused at offset {:.2}", self.virtual_offset);
        }
        self.running = false;
    }

    pub fn resume(&mut self) {
        if !self.running {
            debug!("resumed at offset {:.2}", self.virtual_offset);
        }
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Surface the full content of a live card to the presenter and any
    /// `on_select` callbacks. Layout state is untouched.
    pub fn select_card(&self, id: CardId) -> Option<CardDetail> {
        let card = self.card(id)?;
        let detail = CardDetail::from_content(card.content.clone());
        if let Some(presenter) = &self.presenter {
            presenter.present(&detail);
        }
        for cb in &self.on_select {
            cb(&detail);
        }
        Some(detail)
    }

    pub fn card(&self, id: CardId) -> Option<&Card<S::Handle>> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Live cards in creation order.
    pub fn cards(&self) -> &[Card<S::Handle>] {
        &self.cards
    }

    pub fn virtual_offset(&self) -> f64 {
        self.virtual_offset
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_heights(&self) -> &[f64] {
        self.columns.heights()
    }

    pub fn card_width(&self) -> f64 {
        self.card_width
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn data(&self) -> &DataSource {
        &self.data
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            columns: self.columns.len(),
            card_width: self.card_width,
            virtual_offset: self.virtual_offset,
            column_heights: self.columns.heights().to_vec(),
            cards: self
                .cards
                .iter()
                .map(|c| CardSnapshot {
                    id: c.id.0,
                    column: c.column,
                    x: c.position.x,
                    y: c.position.y,
                    height: c.height,
                    label: c.content.label(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FixedHeightSurface;
    use std::sync::Mutex;

    fn data() -> DataSource {
        DataSource::from_items(vec![
            ContentItem::new("Pay", "Courier", "one", "a"),
            ContentItem::new("Hours", "Cleaner", "two", "b"),
        ])
    }

    fn engine(width: f64, height: f64, heights: Vec<f64>) -> MasonryEngine<FixedHeightSurface> {
        MasonryEngine::initialize(
            Size { width, height },
            FlowConfig::default(),
            data(),
            FixedHeightSurface::new(heights),
            SeededRandom::new(1),
        )
        .unwrap()
    }

    #[test]
    fn initial_fill_reaches_twice_viewport() {
        let e = engine(1200.0, 500.0, vec![90.0, 140.0, 210.0]);
        assert_eq!(e.column_count(), 4);
        assert!(e.column_heights().iter().all(|&h| h >= 1000.0));
        assert!(e.is_running());
        assert_eq!(e.surface().live_count(), e.cards().len());
    }

    #[test]
    fn zero_height_measure_is_floored() {
        let mut e = engine(300.0, 0.0, vec![]);
        e.create_next_card().unwrap();
        assert_eq!(e.cards()[0].height, 60.0);
        assert_eq!(e.column_heights(), &[60.0 + 12.0 + 6.0]);
    }

    #[test]
    fn empty_source_does_not_spin() {
        let mut e = MasonryEngine::initialize(
            Size { width: 800.0, height: 600.0 },
            FlowConfig::default(),
            DataSource::default(),
            FixedHeightSurface::new(vec![100.0]),
            SeededRandom::new(1),
        )
        .unwrap();
        assert!(e.cards().is_empty());
        for _ in 0..10 {
            e.tick(1.0);
        }
        assert!(e.cards().is_empty());
        assert!(e.virtual_offset() > 0.0);
        assert!(e.create_next_card().is_none());
    }

    #[test]
    fn paused_tick_is_noop() {
        let mut e = engine(800.0, 400.0, vec![100.0]);
        e.tick(1.0);
        let off = e.virtual_offset();
        e.pause();
        e.tick(5.0);
        assert_eq!(e.virtual_offset(), off);
        e.resume();
        e.tick(1.0);
        assert!((e.virtual_offset() - (off + 0.32)).abs() < 1e-9);
    }

    #[test]
    fn bad_frame_counts_do_not_move_backwards() {
        let mut e = engine(800.0, 400.0, vec![100.0]);
        e.tick(3.0);
        let off = e.virtual_offset();
        e.tick(-10.0);
        e.tick(f64::NAN);
        assert_eq!(e.virtual_offset(), off);
    }

    #[test]
    fn select_reaches_presenter_and_callbacks() {
        struct Capture(Arc<Mutex<Vec<String>>>);
        impl DetailPresenter for Capture {
            fn present(&self, detail: &CardDetail) {
                self.0.lock().unwrap().push(detail.quote.clone());
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut e = engine(800.0, 300.0, vec![100.0]).with_presenter(Box::new(Capture(seen.clone())));
        let hits = Arc::new(Mutex::new(0usize));
        let h = hits.clone();
        e.on_select(move |_| *h.lock().unwrap() += 1);

        let id = e.cards()[0].id;
        let before = e.column_heights().to_vec();
        let detail = e.select_card(id).unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), &[detail.quote.clone()]);
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(e.column_heights(), before.as_slice());
        assert!(e.select_card(CardId(u64::MAX)).is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = FlowConfig {
            min_card_height: 0.0,
            ..Default::default()
        };
        let res = MasonryEngine::initialize(
            Size { width: 800.0, height: 600.0 },
            cfg,
            data(),
            FixedHeightSurface::new(vec![100.0]),
            SeededRandom::new(1),
        );
        assert!(res.is_err());
    }
}
