use std::time::Duration;

use masonry_flow::{
    ContentItem, DataSource, EventBus, FixedHeightSurface, FlowConfig, FlowController,
    MasonryEngine, SeededRandom, Size, ViewportEvent,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn controller(width: f64, height: f64) -> FlowController<FixedHeightSurface> {
    let data = DataSource::from_items(vec![
        ContentItem::new("Pay", "Courier", "a", "x"),
        ContentItem::new("Hours", "Cleaner", "b", "y"),
    ]);
    let engine = MasonryEngine::initialize(
        Size { width, height },
        FlowConfig::default(),
        data,
        FixedHeightSurface::new(vec![90.0, 160.0, 120.0]),
        SeededRandom::new(11),
    )
    .unwrap();
    FlowController::new(engine)
}

#[test]
fn resize_burst_is_applied_once_after_quiet_period() {
    let mut bus = EventBus::new();
    let mut c = controller(1600.0, 900.0);
    c.attach(&mut bus);

    for (t, width) in [(0, 1400.0), (50, 1100.0), (100, 800.0), (150, 650.0), (190, 500.0)] {
        bus.publish(ViewportEvent::Resized(Size { width, height: 900.0 }));
        c.pump(&mut bus, ms(t));
        c.on_frame(ms(t));
        assert_eq!(c.engine().column_count(), 5, "resized before quiet period at {}ms", t);
    }
    assert!(c.has_pending_resize());

    c.on_frame(ms(300));
    assert_eq!(c.engine().column_count(), 5);

    c.on_frame(ms(390));
    assert!(!c.has_pending_resize());
    assert_eq!(c.engine().column_count(), 2);
    assert_eq!(c.engine().container().width, 500.0);
    // rebuilt from zero, then advanced by at most a few frames
    assert!(c.engine().virtual_offset() < 2.0);
}

#[test]
fn visibility_pauses_without_offset_jump() {
    let mut bus = EventBus::new();
    let mut c = controller(1200.0, 800.0);
    c.attach(&mut bus);

    c.on_frame(ms(0));
    c.on_frame(ms(16));
    let before = c.engine().virtual_offset();

    bus.publish(ViewportEvent::VisibilityChanged(false));
    c.pump(&mut bus, ms(20));
    assert!(!c.engine().is_running());
    for t in (32..5000).step_by(16) {
        c.on_frame(ms(t));
    }
    assert_eq!(c.engine().virtual_offset(), before);

    bus.publish(ViewportEvent::VisibilityChanged(true));
    c.pump(&mut bus, ms(5000));
    assert!(c.engine().is_running());
    c.on_frame(ms(5000));
    let after = c.engine().virtual_offset();
    assert!((after - before - 0.32).abs() < 1e-9);
}

#[test]
fn elapsed_time_is_converted_to_frames() {
    let mut c = controller(1200.0, 800.0);
    c.on_frame(Duration::ZERO);
    assert!((c.engine().virtual_offset() - 0.32).abs() < 1e-9);

    c.on_frame(Duration::from_secs_f64(2.0 / 60.0));
    assert!((c.engine().virtual_offset() - 0.96).abs() < 1e-4);

    // a long stall is capped
    c.on_frame(Duration::from_secs(10));
    assert!((c.engine().virtual_offset() - (0.96 + 4.0 * 0.32)).abs() < 1e-4);
}

#[test]
fn detached_controller_receives_nothing() {
    let mut bus = EventBus::new();
    let mut c = controller(1200.0, 800.0);
    c.attach(&mut bus);
    assert!(c.is_attached());
    assert_eq!(bus.subscriber_count(), 1);

    // re-attaching does not leak a second subscription
    c.attach(&mut bus);
    assert_eq!(bus.subscriber_count(), 1);

    c.detach(&mut bus);
    assert!(!c.is_attached());
    assert_eq!(bus.publish(ViewportEvent::VisibilityChanged(false)), 0);
    assert_eq!(c.pump(&mut bus, ms(0)), 0);
    assert!(c.engine().is_running());
}
