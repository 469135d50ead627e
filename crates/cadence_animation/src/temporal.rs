//! Shared temporal state
//!
//! Tweens and timelines are both [`Temporal`] objects: they share position,
//! looping, pause, and label bookkeeping and differ only in what happens when
//! their position changes. The variant-specific part lives in
//! [`TemporalKind`].

use crate::labels::{Label, LabelTable, Seek};
use crate::ledger::{ActionLedger, StepLedger};
use crate::plugin::{PluginData, TweenPlugin};
use crate::position::LoopShape;
use crate::scheduler::{Scheduler, TargetId, TweenId};
use cadence_core::{Event, EventHandler, Value};
use smallvec::SmallVec;
use std::rc::Rc;

/// Configuration for a new tween or timeline
#[derive(Clone)]
pub struct TweenConfig {
    /// Durations and deltas count ticks instead of milliseconds
    pub use_ticks: bool,
    /// Keep running while the scheduler is globally paused
    pub ignore_global_pause: bool,
    /// Extra passes after the first (-1 for infinite)
    pub loop_count: i32,
    pub reversed: bool,
    /// Alternate direction on every loop
    pub bounce: bool,
    pub time_scale: f64,
    /// Start paused instead of registering with the scheduler
    pub paused: bool,
    /// Initial seek, applied after construction
    pub position: Option<f64>,
    /// Remove every other tween of the same target first
    pub override_existing: bool,
    pub plugin_data: PluginData,
    pub on_change: Option<EventHandler<Scheduler>>,
    pub on_complete: Option<EventHandler<Scheduler>>,
    /// Initial labels (timelines)
    pub labels: Vec<(String, f64)>,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            use_ticks: false,
            ignore_global_pause: false,
            loop_count: 0,
            reversed: false,
            bounce: false,
            time_scale: 1.0,
            paused: false,
            position: None,
            override_existing: false,
            plugin_data: PluginData::default(),
            on_change: None,
            on_complete: None,
            labels: Vec::new(),
        }
    }
}

impl TweenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticks(mut self, use_ticks: bool) -> Self {
        self.use_ticks = use_ticks;
        self
    }

    pub fn with_ignore_global_pause(mut self, ignore: bool) -> Self {
        self.ignore_global_pause = ignore;
        self
    }

    pub fn with_loop(mut self, loop_count: i32) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Loop forever
    pub fn with_infinite_loop(mut self) -> Self {
        self.loop_count = -1;
        self
    }

    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn with_position(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_override(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn with_plugin_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.plugin_data.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, name: impl Into<String>, position: f64) -> Self {
        self.labels.push((name.into(), position));
        self
    }

    pub fn on_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Scheduler, &Event) + 'static,
    {
        self.on_change = Some(Rc::new(handler));
        self
    }

    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Scheduler, &Event) + 'static,
    {
        self.on_complete = Some(Rc::new(handler));
        self
    }
}

/// Single-target state
pub(crate) struct TweenBody {
    pub(crate) target: Option<TargetId>,
    pub(crate) steps: StepLedger,
    pub(crate) actions: ActionLedger,
    pub(crate) plugins: Vec<Rc<dyn TweenPlugin>>,
    pub(crate) plugin_data: PluginData,
    /// Step located by the last update
    pub(crate) step_cursor: usize,
    /// Offset into the located step
    pub(crate) step_position: f64,
    pub(crate) passive: bool,
}

impl TweenBody {
    pub(crate) fn new(
        target: Option<TargetId>,
        plugins: Vec<Rc<dyn TweenPlugin>>,
        plugin_data: PluginData,
    ) -> Self {
        Self {
            target,
            steps: StepLedger::new(),
            actions: ActionLedger::new(),
            plugins,
            plugin_data,
            step_cursor: 0,
            step_position: 0.0,
            passive: false,
        }
    }
}

/// Composite state
#[derive(Default)]
pub(crate) struct TimelineBody {
    pub(crate) children: SmallVec<[TweenId; 4]>,
}

pub(crate) enum TemporalKind {
    Tween(TweenBody),
    Timeline(TimelineBody),
}

/// A tween or timeline
pub struct Temporal {
    pub(crate) duration: f64,
    pub(crate) position: f64,
    pub(crate) raw_position: f64,
    pub(crate) loop_count: i32,
    pub(crate) reversed: bool,
    pub(crate) bounce: bool,
    pub(crate) time_scale: f64,
    pub(crate) use_ticks: bool,
    pub(crate) ignore_global_pause: bool,
    pub(crate) paused: bool,
    pub(crate) labels: LabelTable,
    pub(crate) parent: Option<TweenId>,
    pub(crate) prev: Option<TweenId>,
    pub(crate) next: Option<TweenId>,
    pub(crate) kind: TemporalKind,
}

fn sanitize_time_scale(time_scale: f64) -> f64 {
    if time_scale == 0.0 || !time_scale.is_finite() {
        1.0
    } else {
        time_scale
    }
}

impl Temporal {
    pub(crate) fn new(config: &TweenConfig, kind: TemporalKind) -> Self {
        let mut labels = LabelTable::new();
        if !config.labels.is_empty() {
            labels.replace(config.labels.iter().map(|(n, p)| (n.clone(), *p)));
        }
        Self {
            duration: 0.0,
            position: 0.0,
            raw_position: -1.0,
            loop_count: config.loop_count.max(-1),
            reversed: config.reversed,
            bounce: config.bounce,
            time_scale: sanitize_time_scale(config.time_scale),
            use_ticks: config.use_ticks,
            ignore_global_pause: config.ignore_global_pause,
            paused: true,
            labels,
            parent: None,
            prev: None,
            next: None,
            kind,
        }
    }

    /// Total length of one pass
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Current position within the active pass, in `[0, duration]`
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Accumulated raw position; -1 before the first update
    pub fn raw_position(&self) -> f64 {
        self.raw_position
    }

    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn is_bounce(&self) -> bool {
        self.bounce
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn uses_ticks(&self) -> bool {
        self.use_ticks
    }

    pub fn ignores_global_pause(&self) -> bool {
        self.ignore_global_pause
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The timeline driving this object, if any
    pub fn parent(&self) -> Option<TweenId> {
        self.parent
    }

    pub fn is_timeline(&self) -> bool {
        matches!(self.kind, TemporalKind::Timeline(_))
    }

    pub fn is_tween(&self) -> bool {
        matches!(self.kind, TemporalKind::Tween(_))
    }

    /// The target written by a tween; `None` for timelines
    pub fn target(&self) -> Option<TargetId> {
        match &self.kind {
            TemporalKind::Tween(body) => body.target,
            TemporalKind::Timeline(_) => None,
        }
    }

    /// Whether the last update landed on a passive step
    pub fn is_passive(&self) -> bool {
        match &self.kind {
            TemporalKind::Tween(body) => body.passive,
            TemporalKind::Timeline(_) => false,
        }
    }

    /// Offset into the step located by the last update
    pub fn step_position(&self) -> f64 {
        match &self.kind {
            TemporalKind::Tween(body) => body.step_position,
            TemporalKind::Timeline(_) => 0.0,
        }
    }

    pub fn steps(&self) -> Option<&StepLedger> {
        match &self.kind {
            TemporalKind::Tween(body) => Some(&body.steps),
            TemporalKind::Timeline(_) => None,
        }
    }

    pub fn actions(&self) -> Option<&ActionLedger> {
        match &self.kind {
            TemporalKind::Tween(body) => Some(&body.actions),
            TemporalKind::Timeline(_) => None,
        }
    }

    pub fn plugin_data(&self) -> Option<&PluginData> {
        match &self.kind {
            TemporalKind::Tween(body) => Some(&body.plugin_data),
            TemporalKind::Timeline(_) => None,
        }
    }

    pub fn plugin_data_mut(&mut self) -> Option<&mut PluginData> {
        match &mut self.kind {
            TemporalKind::Tween(body) => Some(&mut body.plugin_data),
            TemporalKind::Timeline(_) => None,
        }
    }

    /// Children of a timeline, in the order they were added
    pub fn children(&self) -> &[TweenId] {
        match &self.kind {
            TemporalKind::Timeline(body) => body.children.as_slice(),
            TemporalKind::Tween(_) => &[],
        }
    }

    pub fn shape(&self) -> LoopShape {
        LoopShape::new(self.duration, self.loop_count, self.reversed, self.bounce)
    }

    /// Normalized position for `raw` without touching any state
    pub fn calculate_position(&self, raw: f64) -> f64 {
        self.shape().position_at(raw)
    }

    pub fn set_loop_count(&mut self, loop_count: i32) {
        self.loop_count = loop_count.max(-1);
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    pub fn set_bounce(&mut self, bounce: bool) {
        self.bounce = bounce;
    }

    /// Change the time scale at runtime
    ///
    /// Zero freezes the object in place; a non-finite scale falls back to 1.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        self.time_scale = if time_scale.is_finite() {
            time_scale
        } else {
            1.0
        };
    }

    pub fn set_use_ticks(&mut self, use_ticks: bool) {
        self.use_ticks = use_ticks;
    }

    pub fn set_ignore_global_pause(&mut self, ignore: bool) {
        self.ignore_global_pause = ignore;
    }

    pub fn add_label(&mut self, name: impl Into<String>, position: f64) {
        self.labels.insert(name, position);
    }

    /// Replace the whole label table
    pub fn set_labels<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.labels.replace(labels);
    }

    /// Labels ordered by position
    pub fn labels(&self) -> &[Label] {
        self.labels.sorted()
    }

    /// The label on or immediately before the current position
    pub fn current_label(&self) -> Option<&str> {
        self.labels.at(self.position)
    }

    /// Resolve a position or label; `None` for an unknown label
    pub fn resolve(&self, seek: impl Into<Seek>) -> Option<f64> {
        self.labels.resolve(&seek.into())
    }

    /// Duration including every extra loop, as seen by a parent timeline
    pub(crate) fn span(&self) -> f64 {
        if self.loop_count > 0 {
            self.duration * (self.loop_count as f64 + 1.0)
        } else {
            self.duration
        }
    }

    pub(crate) fn tween_body_mut(&mut self) -> Option<&mut TweenBody> {
        match &mut self.kind {
            TemporalKind::Tween(body) => Some(body),
            TemporalKind::Timeline(_) => None,
        }
    }

    pub(crate) fn timeline_body_mut(&mut self) -> Option<&mut TimelineBody> {
        match &mut self.kind {
            TemporalKind::Timeline(body) => Some(body),
            TemporalKind::Tween(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(config: &TweenConfig) -> Temporal {
        Temporal::new(config, TemporalKind::Timeline(TimelineBody::default()))
    }

    #[test]
    fn test_new_starts_unpositioned_and_paused() {
        let t = timeline(&TweenConfig::default());
        assert_eq!(t.raw_position(), -1.0);
        assert_eq!(t.position(), 0.0);
        assert!(t.is_paused());
        assert!(t.is_timeline());
        assert_eq!(t.target(), None);
    }

    #[test]
    fn test_time_scale_falls_back_to_one() {
        let mut t = timeline(&TweenConfig::new().with_time_scale(0.0));
        assert_eq!(t.time_scale(), 1.0);

        t.set_time_scale(f64::NAN);
        assert_eq!(t.time_scale(), 1.0);

        t.set_time_scale(2.5);
        assert_eq!(t.time_scale(), 2.5);
    }

    #[test]
    fn test_zero_time_scale_freezes_at_runtime() {
        let mut scheduler = crate::scheduler::Scheduler::new();
        let id = scheduler.tween(None).wait(1000.0).id();
        scheduler.advance(id, 100.0);

        if let Some(t) = scheduler.get_mut(id) {
            t.set_time_scale(0.0);
        }
        assert_eq!(scheduler.get(id).map(|t| t.time_scale()), Some(0.0));

        scheduler.tick(250.0, false);
        assert_eq!(scheduler.get(id).map(|t| t.position()), Some(100.0));
    }

    #[test]
    fn test_span_counts_extra_loops() {
        let mut t = timeline(&TweenConfig::new().with_loop(2));
        t.duration = 100.0;
        assert_eq!(t.span(), 300.0);

        t.set_loop_count(-1);
        assert_eq!(t.span(), 100.0);
    }

    #[test]
    fn test_config_labels_and_current_label() {
        let mut t = timeline(
            &TweenConfig::new()
                .with_label("intro", 0.0)
                .with_label("outro", 800.0),
        );
        assert_eq!(t.resolve("outro"), Some(800.0));
        assert_eq!(t.current_label(), Some("intro"));

        t.position = 900.0;
        assert_eq!(t.current_label(), Some("outro"));

        t.set_labels(vec![("only", 50.0)]);
        assert_eq!(t.resolve("intro"), None);
        assert_eq!(t.labels().len(), 1);
    }

    #[test]
    fn test_calculate_position_has_no_side_effects() {
        let mut t = timeline(&TweenConfig::new().with_bounce(true).with_loop(3));
        t.duration = 100.0;
        assert_eq!(t.calculate_position(150.0), 50.0);
        assert_eq!(t.calculate_position(130.0), 70.0);
        assert_eq!(t.raw_position(), -1.0);
    }
}
