//! Event dispatch system
//!
//! Temporal objects announce position changes and completion through a
//! dispatcher keyed by source id and event type. Handlers receive a mutable
//! context (usually the scheduler that owns the dispatcher) so they can seek,
//! pause, or author animations in response.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::rc::Rc;

/// Event type identifier
pub type EventType = u32;

/// Built-in event types
pub mod event_types {
    use super::EventType;

    /// Dispatched after every effective position update
    pub const CHANGE: EventType = 1;
    /// Dispatched when the final loop finishes and the object pauses itself
    pub const COMPLETE: EventType = 2;
}

/// A notification emitted by a temporal object
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    /// Raw id of the emitting object
    pub source: u64,
    /// Normalized position at dispatch time
    pub position: f64,
    /// Raw (loop-unfolded) position at dispatch time
    pub raw_position: f64,
}

impl Event {
    pub fn new(event_type: EventType, source: u64, position: f64, raw_position: f64) -> Self {
        Self {
            event_type,
            source,
            position,
            raw_position,
        }
    }

    pub fn is_change(&self) -> bool {
        self.event_type == event_types::CHANGE
    }

    pub fn is_complete(&self) -> bool {
        self.event_type == event_types::COMPLETE
    }
}

/// Event handler function type
pub type EventHandler<C> = Rc<dyn Fn(&mut C, &Event)>;

type HandlerList<C> = SmallVec<[EventHandler<C>; 2]>;

/// Dispatches events to registered handlers
pub struct EventDispatcher<C> {
    handlers: FxHashMap<(u64, EventType), HandlerList<C>>,
}

impl<C> EventDispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register an event handler for a source and event type
    pub fn register<F>(&mut self, source: u64, event_type: EventType, handler: F)
    where
        F: Fn(&mut C, &Event) + 'static,
    {
        self.handlers
            .entry((source, event_type))
            .or_default()
            .push(Rc::new(handler));
    }

    /// Check whether anything listens to this source and event type
    pub fn has_handlers(&self, source: u64, event_type: EventType) -> bool {
        self.handlers
            .get(&(source, event_type))
            .is_some_and(|list| !list.is_empty())
    }

    /// Snapshot the handlers for a source and event type
    ///
    /// The snapshot lets the owner of the dispatcher hand itself to the
    /// handlers as the mutable context.
    pub fn handlers(&self, source: u64, event_type: EventType) -> HandlerList<C> {
        self.handlers
            .get(&(source, event_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Dispatch an event to all registered handlers
    pub fn dispatch(&self, cx: &mut C, event: &Event) {
        for handler in self.handlers(event.source, event.event_type) {
            handler(cx, event);
        }
    }

    /// Drop every handler registered for a source
    pub fn remove_source(&mut self, source: u64) {
        self.handlers.retain(|(id, _), _| *id != source);
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<C> Default for EventDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
