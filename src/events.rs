//! Viewport event wiring and the frame driver.
//!
//! Hosts publish resize and visibility notifications on an [`EventBus`]; a
//! [`FlowController`] holds an explicit subscription, debounces resize bursts
//! and drives the engine from a frame clock it is handed. Nothing here owns a
//! timer, so every path can be exercised with synthetic timestamps.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;

use crate::layout::MasonryEngine;
use crate::random::{RandomSource, SeededRandom};
use crate::surface::CardSurface;
use crate::Size;

/// Upper bound on frames credited to a single `on_frame` call, so a long
/// stall does not fling the feed forward.
pub const MAX_CATCH_UP_FRAMES: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Resized(Size),
    /// Whether the container intersects the viewport
    VisibilityChanged(bool),
}

impl ViewportEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewportEvent::Resized(_) => EventKind::Resize,
            ViewportEvent::VisibilityChanged(_) => EventKind::Visibility,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Subscriber {
    id: Subscription,
    kinds: Vec<EventKind>,
    queue: VecDeque<ViewportEvent>,
}

/// Fan-out of viewport events to explicit subscribers. Each subscriber has
/// its own queue, drained by its owner.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kinds: &[EventKind]) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            kinds: kinds.to_vec(),
            queue: VecDeque::new(),
        });
        id
    }

    /// Returns false if the subscription was not registered.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != sub);
        before != self.subscribers.len()
    }

    /// Queue `event` for every interested subscriber; returns how many.
    pub fn publish(&mut self, event: ViewportEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for s in self.subscribers.iter_mut().filter(|s| s.kinds.contains(&kind)) {
            s.queue.push_back(event);
            delivered += 1;
        }
        delivered
    }

    pub fn drain(&mut self, sub: Subscription) -> Vec<ViewportEvent> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == sub)
            .map(|s| s.queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Collapses bursts of resize notifications into a single size, released
/// once no new notification has arrived for the quiet period.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet_period: Duration,
    pending: Option<(Size, Duration)>,
}

impl ResizeDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Record a notification at `now`; replaces any pending size.
    pub fn notify(&mut self, size: Size, now: Duration) {
        self.pending = Some((size, now));
    }

    /// The settled size, if the quiet period has elapsed since the last
    /// notification.
    pub fn poll(&mut self, now: Duration) -> Option<Size> {
        match self.pending {
            Some((size, at)) if now.saturating_sub(at) >= self.quiet_period => {
                self.pending = None;
                Some(size)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Owns an engine and connects it to viewport events and a frame clock.
pub struct FlowController<S: CardSurface, R: RandomSource = SeededRandom> {
    engine: MasonryEngine<S, R>,
    debouncer: ResizeDebouncer,
    subscription: Option<Subscription>,
    last_frame: Option<Duration>,
    frame_interval: Duration,
}

impl<S: CardSurface, R: RandomSource> FlowController<S, R> {
    pub fn new(engine: MasonryEngine<S, R>) -> Self {
        let debouncer = ResizeDebouncer::new(engine.config().resize_quiet_period());
        let frame_interval = engine.config().frame_interval();
        Self {
            engine,
            debouncer,
            subscription: None,
            last_frame: None,
            frame_interval,
        }
    }

    /// Subscribe to resize and visibility events. Re-attaching replaces the
    /// previous subscription on the same bus.
    pub fn attach(&mut self, bus: &mut EventBus) {
        if let Some(old) = self.subscription.take() {
            bus.unsubscribe(old);
        }
        self.subscription = Some(bus.subscribe(&[EventKind::Resize, EventKind::Visibility]));
    }

    pub fn detach(&mut self, bus: &mut EventBus) {
        if let Some(sub) = self.subscription.take() {
            bus.unsubscribe(sub);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handle every queued event for this controller. Returns the count.
    pub fn pump(&mut self, bus: &mut EventBus, now: Duration) -> usize {
        let Some(sub) = self.subscription else {
            return 0;
        };
        let events = bus.drain(sub);
        let n = events.len();
        for event in events {
            self.handle_event(event, now);
        }
        n
    }

    pub fn handle_event(&mut self, event: ViewportEvent, now: Duration) {
        match event {
            ViewportEvent::Resized(size) => self.debouncer.notify(size, now),
            ViewportEvent::VisibilityChanged(true) => self.engine.resume(),
            ViewportEvent::VisibilityChanged(false) => {
                self.engine.pause();
                self.last_frame = None;
            }
        }
    }

    /// One animation frame at `now`: apply a settled resize, then advance by
    /// the elapsed time measured in nominal frames.
    pub fn on_frame(&mut self, now: Duration) {
        if let Some(size) = self.debouncer.poll(now) {
            debug!("applying debounced resize to {:.0}x{:.0}", size.width, size.height);
            self.engine.handle_resize(size);
        }
        if !self.engine.is_running() {
            self.last_frame = None;
            return;
        }
        let frames = match self.last_frame {
            None => 1.0,
            Some(prev) => {
                let elapsed = now.saturating_sub(prev).as_secs_f64();
                let interval = self.frame_interval.as_secs_f64();
                if interval > 0.0 {
                    (elapsed / interval).min(MAX_CATCH_UP_FRAMES)
                } else {
                    1.0
                }
            }
        };
        self.last_frame = Some(now);
        self.engine.tick(frames);
    }

    pub fn has_pending_resize(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn engine(&self) -> &MasonryEngine<S, R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MasonryEngine<S, R> {
        &mut self.engine
    }

    pub fn into_engine(self) -> MasonryEngine<S, R> {
        self.engine
    }
}
