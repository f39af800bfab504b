//! Layout engine behaviour over realistic runs

use masonry_flow::{
    ContentItem, DataSource, FixedHeightSurface, FlowConfig, MasonryEngine, SeededRandom, Size,
};

const VARIED: [f64; 7] = [60.0, 240.0, 95.0, 130.0, 310.0, 75.0, 180.0];

fn data() -> DataSource {
    DataSource::from_items(vec![
        ContentItem::new("Pay", "Courier", "Paid per parcel", "Interview"),
        ContentItem::new("Hours", "Cleaner", "Night shift", "Survey"),
        ContentItem::new("Safety", "Care worker", "Lifting alone", "Focus group"),
    ])
}

fn engine_with(
    width: f64,
    height: f64,
    heights: Vec<f64>,
    config: FlowConfig,
) -> MasonryEngine<FixedHeightSurface> {
    MasonryEngine::initialize(
        Size { width, height },
        config,
        data(),
        FixedHeightSurface::new(heights),
        SeededRandom::new(2024),
    )
    .expect("engine should initialize")
}

#[test]
fn five_column_scenario_places_sixth_card_in_lowest_column() {
    // Zero viewport height: no initial fill, cards are inserted by hand.
    let mut e = engine_with(
        1600.0,
        0.0,
        vec![100.0, 150.0, 80.0, 200.0, 120.0],
        FlowConfig::default(),
    );
    assert_eq!(e.column_count(), 5);
    assert!((e.card_width() - (1600.0 - 6.0 * 12.0) / 5.0).abs() < 1e-9);
    assert!(e.cards().is_empty());

    for _ in 0..5 {
        e.create_next_card().unwrap();
    }
    assert_eq!(e.column_heights(), &[118.0, 168.0, 98.0, 218.0, 138.0]);

    let columns: Vec<usize> = e.cards().iter().map(|c| c.column).collect();
    assert_eq!(columns, vec![0, 1, 2, 3, 4]);

    let sixth = e.create_next_card().unwrap();
    let card = e.card(sixth).unwrap();
    assert_eq!(card.column, 2);
    assert_eq!(card.position.y, 98.0);
    let expected_x = 12.0 + 2.0 * (e.card_width() + 12.0);
    assert!((card.position.x - expected_x).abs() < 1e-9);
}

#[test]
fn resize_from_five_to_two_columns_clears_before_rebuild() {
    let mut e = engine_with(1600.0, 900.0, VARIED.to_vec(), FlowConfig::default());
    for _ in 0..50 {
        e.tick(1.0);
    }
    assert_eq!(e.column_count(), 5);
    assert!(!e.cards().is_empty());

    e.reset_layout(Size { width: 500.0, height: 900.0 });
    assert!(e.cards().is_empty());
    assert_eq!(e.surface().live_count(), 0);
    assert_eq!(e.column_heights(), &[0.0, 0.0]);
    assert_eq!(e.virtual_offset(), 0.0);

    e.build_initial_layout();
    assert_eq!(e.column_count(), 2);
    assert!(e.column_heights().iter().all(|&h| h >= 1800.0));
}

#[test]
fn handle_resize_rebuilds_and_keeps_running_state() {
    let mut e = engine_with(1600.0, 900.0, VARIED.to_vec(), FlowConfig::default());
    e.pause();
    e.handle_resize(Size { width: 700.0, height: 600.0 });
    assert_eq!(e.column_count(), 3);
    assert!(!e.is_running());
    assert!(e.column_heights().iter().all(|&h| h >= 1200.0));
    assert_eq!(e.surface().live_count(), e.cards().len());
}

#[test]
fn column_spread_never_exceeds_largest_advance() {
    let mut e = engine_with(1200.0, 0.0, VARIED.to_vec(), FlowConfig::default());
    let largest_advance = 310.0 + 12.0 + 6.0;
    for _ in 0..200 {
        e.create_next_card().unwrap();
        let heights = e.column_heights();
        let max = heights.iter().copied().fold(f64::MIN, f64::max);
        let min = heights.iter().copied().fold(f64::MAX, f64::min);
        assert!(max - min <= largest_advance + 1e-9);
    }
}

#[test]
fn cards_in_a_column_never_overlap() {
    let config = FlowConfig {
        speed: 7.0,
        ..Default::default()
    };
    let mut e = engine_with(1000.0, 700.0, VARIED.to_vec(), config);
    for _ in 0..400 {
        e.tick(1.0);
        for col in 0..e.column_count() {
            let mut prev_bottom: Option<f64> = None;
            for card in e.cards().iter().filter(|c| c.column == col) {
                if let Some(bottom) = prev_bottom {
                    assert!(card.position.y >= bottom + 12.0 - 1e-9);
                }
                prev_bottom = Some(card.bottom());
            }
        }
    }
}

#[test]
fn offset_is_strictly_increasing_while_running() {
    let mut e = engine_with(800.0, 600.0, VARIED.to_vec(), FlowConfig::default());
    let mut last = e.virtual_offset();
    for _ in 0..100 {
        e.tick(1.0);
        assert!(e.virtual_offset() > last);
        last = e.virtual_offset();
    }
    assert!((last - 100.0 * 0.32).abs() < 1e-6);
    assert!((e.surface().translation() + last).abs() < 1e-9);
}

#[test]
fn eviction_keeps_live_set_bounded() {
    let config = FlowConfig {
        speed: 25.0,
        ..Default::default()
    };
    let mut e = engine_with(1600.0, 900.0, VARIED.to_vec(), config);
    let mut max_live = 0;
    for _ in 0..2000 {
        e.tick(1.0);
        let threshold = e.virtual_offset() - e.config().retention_margin;
        assert!(e.cards().iter().all(|c| c.bottom() >= threshold));
        assert_eq!(e.surface().live_count(), e.cards().len());
        max_live = max_live.max(e.cards().len());
    }

    let created = e.cards().last().map(|c| c.id.0 + 1).unwrap();
    assert!(created > 10 * max_live as u64);
    // Nothing visible is missing: the feed still reaches past the viewport.
    let tallest = e.column_heights().iter().copied().fold(f64::MIN, f64::max);
    assert!(tallest - e.virtual_offset() >= 1.5 * 900.0);
}

#[test]
fn narrow_container_clamps_card_width() {
    let e = engine_with(40.0, 300.0, VARIED.to_vec(), FlowConfig::default());
    assert_eq!(e.column_count(), 1);
    assert_eq!(e.card_width(), 60.0);
    assert!(e.cards().iter().all(|c| c.position.x == 12.0));
}

#[test]
fn snapshot_reflects_live_cards() {
    let e = engine_with(1600.0, 400.0, VARIED.to_vec(), FlowConfig::default());
    let snap = e.snapshot();
    assert_eq!(snap.columns, 5);
    assert_eq!(snap.cards.len(), e.cards().len());
    assert_eq!(snap.column_heights, e.column_heights().to_vec());
    assert!(snap.cards.iter().all(|c| c.label.contains(" · ")));
}
