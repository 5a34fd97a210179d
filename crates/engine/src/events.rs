//! Edit event bus.
//!
//! Each engine instance owns its own `EventBus`; there is no global
//! listener state, so independent timeline sessions never see each
//! other's events. Multiple handlers may be registered per event kind
//! and every matching handler fires, in registration order.

use tc_common::{ClipId, TimeMs, TrackId, ZoneId};
use tc_timeline::Gap;
use tracing::debug;

/// A notification emitted after a successful edit.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A clip was inserted into the timeline.
    ClipAdded {
        clip_id: ClipId,
        track_id: TrackId,
        position: TimeMs,
    },
    /// A clip was moved, possibly across tracks. `position` is the
    /// snap-resolved final position.
    ClipMoved {
        clip_id: ClipId,
        track_id: TrackId,
        position: TimeMs,
    },
    /// A clip was deleted. `shifted` lists the clips the deletion ripple
    /// moved, in ascending start order.
    ClipDeleted {
        clip_id: ClipId,
        track_id: TrackId,
        shifted: Vec<ClipId>,
    },
    /// A ripple pass moved the listed clips.
    RippleCompleted {
        track_id: TrackId,
        affected: Vec<ClipId>,
    },
    /// A gap-close pass saw a gap at or above the close threshold and
    /// deliberately left it in place.
    GapDetected { gap: Gap },
    /// A magnetic zone was added or removed.
    ZonesChanged { zone_id: ZoneId, added: bool },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ClipAdded { .. } => EventKind::ClipAdded,
            Self::ClipMoved { .. } => EventKind::ClipMoved,
            Self::ClipDeleted { .. } => EventKind::ClipDeleted,
            Self::RippleCompleted { .. } => EventKind::RippleCompleted,
            Self::GapDetected { .. } => EventKind::GapDetected,
            Self::ZonesChanged { .. } => EventKind::ZonesChanged,
        }
    }
}

/// Discriminant used when registering handlers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    ClipAdded,
    ClipMoved,
    ClipDeleted,
    RippleCompleted,
    GapDetected,
    ZonesChanged,
}

/// Token returned by [`EventBus::on`], used to unregister the handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

type Handler = Box<dyn Fn(&EngineEvent) + Send>;

/// Per-kind handler registry.
///
/// Registration is a list, not a slot: registering a second handler for
/// the same kind keeps both, and each `emit` invokes every handler whose
/// kind matches.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(HandlerId, EventKind, Handler)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind. Returns the id to pass to
    /// [`off`](Self::off).
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&EngineEvent) + Send + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, kind, Box::new(handler)));
        debug!(?kind, handler_id = id.0, "Event handler registered");
        id
    }

    /// Unregister a handler. Returns whether it was registered.
    pub fn off(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _, _)| *hid != id);
        self.handlers.len() != before
    }

    /// Invoke every handler registered for the event's kind, in
    /// registration order.
    pub fn emit(&self, event: &EngineEvent) {
        let kind = event.kind();
        for (_, handler_kind, handler) in &self.handlers {
            if *handler_kind == kind {
                handler(event);
            }
        }
    }

    /// Number of registered handlers across all kinds.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn moved_event() -> EngineEvent {
        EngineEvent::ClipMoved {
            clip_id: ClipId::new("c1"),
            track_id: TrackId::new("v1"),
            position: TimeMs(5000.0),
        }
    }

    #[test]
    fn multiple_handlers_per_kind_all_fire() {
        let mut bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = hits.clone();
            bus.on(EventKind::ClipMoved, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.emit(&moved_event());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn handlers_filter_by_kind() {
        let mut bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = hits.clone();
        bus.on(EventKind::ClipDeleted, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(&moved_event());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn off_unregisters() {
        let mut bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = hits.clone();
        let id = bus.on(EventKind::ClipMoved, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bus.off(id));
        assert!(!bus.off(id));

        bus.emit(&moved_event());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.handler_count(), 0);
    }

    #[test]
    fn event_kind_matches_variant() {
        assert_eq!(moved_event().kind(), EventKind::ClipMoved);
        let ev = EngineEvent::GapDetected {
            gap: Gap {
                track_id: TrackId::new("v1"),
                start: TimeMs(1000.0),
                end: TimeMs(3000.0),
            },
        };
        assert_eq!(ev.kind(), EventKind::GapDetected);
    }
}
