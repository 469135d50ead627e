//! Animation scheduler
//!
//! Owns every tween, timeline, and target, and keeps the active registry: a
//! doubly-linked list of unpaused temporal objects that `tick` advances once
//! per heartbeat. Pausing or unpausing is what moves an object in or out of
//! the list.

use crate::plugin::TweenPlugin;
use crate::temporal::Temporal;
use cadence_core::events::event_types;
use cadence_core::{Animatable, CadenceError, Event, EventDispatcher, EventType, Result, Value};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use std::rc::Rc;
use std::time::Instant;

new_key_type! {
    pub struct TweenId;
    pub struct TargetId;
}

/// Event source id of a temporal object
pub fn event_source(id: TweenId) -> u64 {
    id.data().as_ffi()
}

/// Temporal object that emitted an event
pub fn event_tween(event: &Event) -> TweenId {
    TweenId::from(KeyData::from_ffi(event.source))
}

/// External heartbeat the scheduler attaches to while anything is active
pub trait ClockSource {
    /// The first object became active
    fn subscribe(&mut self);

    /// The last active object was paused or removed
    fn unsubscribe(&mut self);
}

/// Scheduler configuration
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Frame rate assumed by [`Scheduler::tick_frame`]
    pub target_fps: u32,
    /// Upper bound on the wall-clock delta fed to [`Scheduler::tick_elapsed`]
    pub max_delta_ms: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 120,
            max_delta_ms: 250.0,
        }
    }
}

impl SchedulerConfig {
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_max_delta(mut self, max_delta_ms: f64) -> Self {
        self.max_delta_ms = max_delta_ms;
        self
    }

    /// Length of one frame in milliseconds
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps.max(1) as f64
    }
}

/// The scheduler that owns and ticks all temporal objects
pub struct Scheduler {
    pub(crate) tweens: SlotMap<TweenId, Temporal>,
    pub(crate) targets: SlotMap<TargetId, Box<dyn Animatable>>,
    /// Number of active tweens writing to each target
    pub(crate) target_counts: FxHashMap<TargetId, u32>,
    pub(crate) head: Option<TweenId>,
    pub(crate) tail: Option<TweenId>,
    pub(crate) plugins: Vec<Rc<dyn TweenPlugin>>,
    pub(crate) events: EventDispatcher<Scheduler>,
    clock: Option<Box<dyn ClockSource>>,
    subscribed: bool,
    config: SchedulerConfig,
    last_frame: Instant,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            tweens: SlotMap::with_key(),
            targets: SlotMap::with_key(),
            target_counts: FxHashMap::default(),
            head: None,
            tail: None,
            plugins: Vec::new(),
            events: EventDispatcher::new(),
            clock: None,
            subscribed: false,
            config,
            last_frame: Instant::now(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.config.target_fps = fps;
    }

    // ---- targets ----

    pub fn add_target<T: Animatable + 'static>(&mut self, target: T) -> TargetId {
        self.targets.insert(Box::new(target))
    }

    pub fn target(&self, id: TargetId) -> Option<&dyn Animatable> {
        self.targets.get(id).map(|t| &**t)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut (dyn Animatable + 'static)> {
        self.targets.get_mut(id).map(|t| &mut **t)
    }

    /// Read a property of a target
    pub fn value(&self, target: TargetId, name: &str) -> Option<Value> {
        self.targets.get(target).and_then(|t| t.get(name))
    }

    /// Read a numeric property of a target
    pub fn number(&self, target: TargetId, name: &str) -> Option<f64> {
        self.value(target, name).and_then(|v| v.as_number())
    }

    /// Remove a target, pausing every tween that writes to it
    pub fn remove_target(&mut self, id: TargetId) -> Option<Box<dyn Animatable>> {
        self.remove_tweens(id);
        self.targets.remove(id)
    }

    // ---- temporal objects ----

    pub fn get(&self, id: TweenId) -> Option<&Temporal> {
        self.tweens.get(id)
    }

    pub fn get_mut(&mut self, id: TweenId) -> Option<&mut Temporal> {
        self.tweens.get_mut(id)
    }

    pub fn contains(&self, id: TweenId) -> bool {
        self.tweens.contains_key(id)
    }

    /// Number of live temporal objects, active or not
    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// Temporal objects cannot be cloned
    pub fn try_clone(&self, id: TweenId) -> Result<TweenId> {
        match self.tweens.get(id) {
            Some(entry) if entry.is_timeline() => Err(CadenceError::Unsupported(
                "Timeline can not be cloned".to_string(),
            )),
            Some(_) => Err(CadenceError::Unsupported(
                "Tween can not be cloned".to_string(),
            )),
            None => Err(CadenceError::UnknownTween),
        }
    }

    /// Destroy a temporal object
    ///
    /// The object is unregistered, detached from its parent timeline, and
    /// its listeners are dropped. Children of a removed timeline stay alive
    /// but lose their parent.
    pub fn remove(&mut self, id: TweenId) -> Result<()> {
        let parent = match self.tweens.get(id) {
            Some(entry) => entry.parent,
            None => return Err(CadenceError::UnknownTween),
        };

        self.set_paused(id, true);
        if let Some(parent) = parent {
            self.remove_tween(parent, id);
        }

        if let Some(entry) = self.tweens.remove(id) {
            for &child in entry.children() {
                if let Some(child) = self.tweens.get_mut(child) {
                    child.parent = None;
                }
            }
        }
        self.events.remove_source(event_source(id));
        tracing::debug!("Removed temporal object {:?}", id);
        Ok(())
    }

    // ---- events ----

    /// Listen for position changes of a temporal object
    pub fn on_change<F>(&mut self, id: TweenId, handler: F)
    where
        F: Fn(&mut Scheduler, &Event) + 'static,
    {
        self.add_listener(id, event_types::CHANGE, handler);
    }

    /// Listen for completion of a temporal object
    pub fn on_complete<F>(&mut self, id: TweenId, handler: F)
    where
        F: Fn(&mut Scheduler, &Event) + 'static,
    {
        self.add_listener(id, event_types::COMPLETE, handler);
    }

    pub fn add_listener<F>(&mut self, id: TweenId, event_type: EventType, handler: F)
    where
        F: Fn(&mut Scheduler, &Event) + 'static,
    {
        self.events.register(event_source(id), event_type, handler);
    }

    pub(crate) fn dispatch(&mut self, id: TweenId, event_type: EventType) {
        let source = event_source(id);
        if !self.events.has_handlers(source, event_type) {
            return;
        }
        let Some(entry) = self.tweens.get(id) else {
            return;
        };
        let event = Event::new(event_type, source, entry.position, entry.raw_position);
        for handler in self.events.handlers(source, event_type) {
            handler(self, &event);
        }
    }

    // ---- plugins ----

    /// Install a plugin for every tween created from now on
    ///
    /// Returns false if a plugin with the same id is already installed.
    pub fn install_plugin<P: TweenPlugin + 'static>(&mut self, plugin: P) -> bool {
        let id = plugin.id();
        if self.plugins.iter().any(|p| p.id() == id) {
            return false;
        }
        let priority = plugin.priority();
        let index = self
            .plugins
            .iter()
            .position(|p| priority < p.priority())
            .unwrap_or(self.plugins.len());
        self.plugins.insert(index, Rc::new(plugin));
        tracing::debug!("Installed plugin {} (priority {})", id, priority);
        true
    }

    /// Ids of the installed plugins, in priority order
    pub fn plugin_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|p| p.id())
    }

    // ---- clock ----

    /// Attach the heartbeat notified when the registry becomes (in)active
    pub fn set_clock<C: ClockSource + 'static>(&mut self, clock: C) {
        let mut clock: Box<dyn ClockSource> = Box::new(clock);
        if self.subscribed {
            clock.subscribe();
        }
        self.clock = Some(clock);
    }

    pub fn is_clock_subscribed(&self) -> bool {
        self.subscribed
    }

    fn subscribe_clock(&mut self) {
        if self.subscribed {
            return;
        }
        self.subscribed = true;
        self.last_frame = Instant::now();
        if let Some(clock) = self.clock.as_mut() {
            clock.subscribe();
        }
        tracing::debug!("Scheduler subscribed to clock");
    }

    fn unsubscribe_clock(&mut self) {
        if !self.subscribed {
            return;
        }
        self.subscribed = false;
        if let Some(clock) = self.clock.as_mut() {
            clock.unsubscribe();
        }
        tracing::debug!("Scheduler unsubscribed from clock");
    }

    // ---- registry ----

    /// Pause or resume a temporal object
    ///
    /// Resuming appends it to the active list; pausing splices it out.
    pub fn set_paused(&mut self, id: TweenId, paused: bool) {
        let Some(entry) = self.tweens.get_mut(id) else {
            tracing::warn!("set_paused on removed temporal object {:?}", id);
            return;
        };

        if !paused && entry.paused {
            entry.paused = false;
            if let Some(target) = entry.target() {
                *self.target_counts.entry(target).or_insert(0) += 1;
            }
            self.link_tail(id);
            tracing::debug!("Registered {:?}", id);
            self.subscribe_clock();
        } else if paused && !entry.paused {
            entry.paused = true;
            if let Some(target) = entry.target() {
                if let Some(count) = self.target_counts.get_mut(&target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        self.target_counts.remove(&target);
                    }
                }
            }
            self.unlink(id);
            tracing::debug!("Unregistered {:?}", id);
            if self.head.is_none() {
                self.unsubscribe_clock();
            }
        }
    }

    pub fn play(&mut self, id: TweenId) {
        self.set_paused(id, false);
    }

    pub fn pause(&mut self, id: TweenId) {
        self.set_paused(id, true);
    }

    fn link_tail(&mut self, id: TweenId) {
        let tail = self.tail;
        if let Some(entry) = self.tweens.get_mut(id) {
            entry.prev = tail;
            entry.next = None;
        }
        match tail.and_then(|t| self.tweens.get_mut(t)) {
            Some(last) => last.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    fn unlink(&mut self, id: TweenId) {
        let (prev, next) = match self.tweens.get_mut(id) {
            Some(entry) => (entry.prev.take(), entry.next.take()),
            None => return,
        };
        match next.and_then(|n| self.tweens.get_mut(n)) {
            Some(after) => after.prev = prev,
            None => self.tail = prev,
        }
        match prev.and_then(|p| self.tweens.get_mut(p)) {
            Some(before) => before.next = next,
            None => self.head = next,
        }
    }

    /// Advance every active object once
    ///
    /// Objects using ticks advance by 1, everything else by `delta`. While
    /// `global_paused` is set only objects ignoring the global pause move.
    pub fn tick(&mut self, delta: f64, global_paused: bool) {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(entry) = self.tweens.get(id) else {
                break;
            };
            // Advancing may complete and unlink this entry
            cursor = entry.next;
            if (global_paused && !entry.ignore_global_pause) || entry.paused {
                continue;
            }
            let step = if entry.use_ticks { 1.0 } else { delta };
            self.advance(id, step);
        }
    }

    /// Tick with the wall-clock time elapsed since the previous call
    ///
    /// Returns the delta used, clamped to `max_delta_ms`.
    pub fn tick_elapsed(&mut self, global_paused: bool) -> f64 {
        let now = Instant::now();
        let delta = (now - self.last_frame).as_secs_f64() * 1000.0;
        self.last_frame = now;
        let delta = delta.min(self.config.max_delta_ms);
        self.tick(delta, global_paused);
        delta
    }

    /// Tick by one frame at the configured frame rate
    pub fn tick_frame(&mut self, global_paused: bool) {
        let delta = self.config.frame_interval_ms();
        self.tick(delta, global_paused);
    }

    /// Pause every active tween writing to `target`
    pub fn remove_tweens(&mut self, target: TargetId) {
        if self.target_counts.get(&target).copied().unwrap_or(0) == 0 {
            return;
        }
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(entry) = self.tweens.get(id) else {
                break;
            };
            cursor = entry.next;
            if entry.target() == Some(target) {
                self.set_paused(id, true);
            }
        }
        self.target_counts.remove(&target);
        tracing::debug!("Removed tweens of target {:?}", target);
    }

    /// Pause everything in bulk without per-object transitions
    pub fn remove_all_tweens(&mut self) {
        let mut cursor = self.head.take();
        while let Some(id) = cursor {
            let Some(entry) = self.tweens.get_mut(id) else {
                break;
            };
            cursor = entry.next.take();
            entry.prev = None;
            entry.paused = true;
        }
        self.tail = None;
        self.target_counts.clear();
        tracing::debug!("Removed all tweens");
        self.unsubscribe_clock();
    }

    /// Whether any tween is active, or any tween of `target` when given
    pub fn has_active_tweens(&self, target: Option<TargetId>) -> bool {
        match target {
            Some(target) => self.target_counts.get(&target).is_some_and(|&n| n > 0),
            None => self.head.is_some(),
        }
    }

    /// Number of active tweens writing to `target`
    pub fn live_tween_count(&self, target: TargetId) -> u32 {
        self.target_counts.get(&target).copied().unwrap_or(0)
    }

    /// Active objects from head to tail
    pub fn active_tweens(&self) -> impl Iterator<Item = TweenId> + '_ {
        std::iter::successors(self.head, move |id| {
            self.tweens.get(*id).and_then(|entry| entry.next)
        })
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
