//! Single-target tweens
//!
//! A tween owns a step ledger for one target. Authoring appends steps and
//! actions at the tween's current duration; playback locates the step under
//! the current position and writes interpolated values into the target.
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::Scheduler;
//! use cadence_core::{props, PropertyBag};
//!
//! let mut scheduler = Scheduler::new();
//! let ball = scheduler.add_target(PropertyBag::from(props! { "x" => 0.0 }));
//!
//! let tween = scheduler
//!     .tween(ball)
//!     .to(props! { "x" => 10.0 }, 1000.0)
//!     .id();
//!
//! scheduler.advance(tween, 500.0);
//! assert_eq!(scheduler.number(ball, "x"), Some(5.0));
//! ```

use crate::easing::Easing;
use crate::ledger::{ActionCall, ActionKind};
use crate::plugin::{PluginChange, PluginContext, PluginInit, StepEdit};
use crate::scheduler::{Scheduler, TargetId, TweenId};
use crate::temporal::{Temporal, TemporalKind, TweenBody, TweenConfig};
use cadence_core::events::event_types;
use cadence_core::{CadenceError, PropMap, Result, Value};
use std::rc::Rc;

impl Scheduler {
    /// Start authoring a tween with the default configuration
    ///
    /// The tween registers with the scheduler immediately.
    pub fn tween(&mut self, target: impl Into<Option<TargetId>>) -> TweenBuilder<'_> {
        self.tween_with(target, TweenConfig::default())
    }

    pub fn tween_with(
        &mut self,
        target: impl Into<Option<TargetId>>,
        config: TweenConfig,
    ) -> TweenBuilder<'_> {
        let id = self.create_tween(target, config);
        TweenBuilder {
            scheduler: self,
            id,
        }
    }

    /// Continue authoring an existing tween
    pub fn edit(&mut self, id: TweenId) -> TweenBuilder<'_> {
        TweenBuilder {
            scheduler: self,
            id,
        }
    }

    /// Like [`edit`](Self::edit), but checks that `id` is a live tween
    pub fn try_edit(&mut self, id: TweenId) -> Result<TweenBuilder<'_>> {
        match self.tweens.get(id).map(Temporal::is_tween) {
            Some(true) => Ok(self.edit(id)),
            Some(false) => Err(CadenceError::NotATween),
            None => Err(CadenceError::UnknownTween),
        }
    }

    /// Create an empty tween
    pub fn create_tween(
        &mut self,
        target: impl Into<Option<TargetId>>,
        config: TweenConfig,
    ) -> TweenId {
        let target = target.into();
        if config.override_existing {
            if let Some(target) = target {
                self.remove_tweens(target);
            }
        }
        let body = TweenBody::new(target, self.plugins.clone(), config.plugin_data.clone());
        let id = self
            .tweens
            .insert(Temporal::new(&config, TemporalKind::Tween(body)));
        self.init_temporal(id, &config);
        id
    }

    /// Listener registration, initial pause state and seek shared by tweens
    /// and timelines
    pub(crate) fn init_temporal(&mut self, id: TweenId, config: &TweenConfig) {
        if let Some(handler) = config.on_change.clone() {
            self.add_listener(id, event_types::CHANGE, move |s, e| handler(s, e));
        }
        if let Some(handler) = config.on_complete.clone() {
            self.add_listener(id, event_types::COMPLETE, move |s, e| handler(s, e));
        }
        if !config.paused {
            self.set_paused(id, false);
        }
        if let Some(position) = config.position {
            self.set_position(id, position);
        }
    }

    /// Append a step continuing from the current tail snapshot
    fn add_step(
        &mut self,
        id: TweenId,
        duration: f64,
        ease: Option<Easing>,
        passive: bool,
    ) -> Option<usize> {
        let entry = self.tweens.get_mut(id)?;
        let TemporalKind::Tween(body) = &mut entry.kind else {
            tracing::warn!("{:?} is a timeline; steps need a tween", id);
            return None;
        };
        let props = body.steps.tail().props().clone();
        let index = body.steps.push(duration, props, ease, passive);
        entry.duration = body.steps.duration();
        Some(index)
    }

    fn add_action(&mut self, id: TweenId, kind: ActionKind) {
        let Some(entry) = self.tweens.get_mut(id) else {
            tracing::warn!("authoring on removed temporal object {:?}", id);
            return;
        };
        let start = entry.duration;
        match entry.tween_body_mut() {
            Some(body) => {
                body.actions.push(start, kind);
            }
            None => tracing::warn!("{:?} is a timeline; actions need a tween", id),
        }
    }

    /// Refresh the duration of every timeline above `id`
    pub(crate) fn refresh_ancestors(&mut self, id: TweenId) {
        let mut cursor = self.tweens.get(id).and_then(|entry| entry.parent);
        while let Some(parent) = cursor {
            self.update_duration(parent);
            cursor = self.tweens.get(parent).and_then(|entry| entry.parent);
        }
    }

    fn tween_wait(&mut self, id: TweenId, duration: f64, passive: bool) {
        if duration.is_nan() || duration <= 0.0 {
            return;
        }
        if self.add_step(id, duration, None, passive).is_some() {
            self.refresh_ancestors(id);
        }
    }

    fn tween_to(&mut self, id: TweenId, props: &PropMap, duration: f64, ease: Option<Easing>) {
        let duration = if duration > 0.0 { duration } else { 0.0 };
        if let Some(index) = self.add_step(id, duration, ease, false) {
            self.append_props(id, index, props, true);
            self.refresh_ancestors(id);
        }
    }

    /// Merge authored properties into step `index`
    ///
    /// A property named for the first time gets its initial value from the
    /// plugins or the live target, back-filled into every earlier step.
    fn append_props(
        &mut self,
        id: TweenId,
        index: usize,
        props: &PropMap,
        run_step_plugins: bool,
    ) {
        let Scheduler {
            tweens, targets, ..
        } = self;
        let Some(body) = tweens.get_mut(id).and_then(Temporal::tween_body_mut) else {
            return;
        };
        let target = body.target.and_then(|key| targets.get(key)).map(|t| &**t);

        let mut clean = PropMap::new();
        for (name, value) in props {
            if let Some(step) = body.steps.get_mut(index) {
                step.props.insert(name.clone(), value.clone());
            }
            clean.insert(name.clone(), value.clone());
            if body.steps.head().props().contains_key(name) {
                continue;
            }

            let mut initial: Option<Value> = None;
            let mut ignored = false;
            for plugin in body.plugins.iter().rev() {
                let mut cx = PluginContext {
                    tween: id,
                    target,
                    data: &mut body.plugin_data,
                };
                match plugin.init(&mut cx, name, initial.as_ref()) {
                    PluginInit::Pass => {}
                    PluginInit::Value(value) => initial = Some(value),
                    PluginInit::Ignore => {
                        ignored = true;
                        break;
                    }
                }
            }
            if ignored {
                if let Some(step) = body.steps.get_mut(index) {
                    step.props.shift_remove(name);
                }
                clean.shift_remove(name);
                continue;
            }

            let initial = initial
                .or_else(|| target.and_then(|t| t.get(name)))
                .unwrap_or(Value::Null);
            body.steps.backfill(index - 1, name, &initial);
        }

        let mut injected = PropMap::new();
        if run_step_plugins && !body.plugins.is_empty() {
            if let Some((prev, step)) = body.steps.pair_mut(index) {
                for plugin in body.plugins.iter().rev() {
                    let mut cx = PluginContext {
                        tween: id,
                        target,
                        data: &mut body.plugin_data,
                    };
                    let mut edit = StepEdit {
                        index,
                        start: &prev.props,
                        end: &mut step.props,
                        injected: &mut injected,
                    };
                    plugin.step(&mut cx, &mut edit, &clean);
                }
            }
        }

        if !injected.is_empty() {
            self.append_props(id, index, &injected, false);
        }
    }

    /// Write the interpolated values of the current step into the target
    pub(crate) fn update_tween_props(&mut self, id: TweenId, end: bool) {
        let Scheduler {
            tweens, targets, ..
        } = self;
        let Some(entry) = tweens.get_mut(id) else {
            return;
        };
        let t = entry.position;
        let d = entry.duration;
        let TemporalKind::Tween(body) = &mut entry.kind else {
            return;
        };

        if body.steps.is_empty() {
            body.step_position = 0.0;
            return;
        }
        let index = body.steps.locate(body.step_cursor, t);
        body.step_cursor = index;
        let (Some(prev), Some(step)) = (body.steps.get(index - 1), body.steps.get(index)) else {
            return;
        };
        body.step_position = t - step.start;

        let Some(target) = body.target.and_then(|key| targets.get_mut(key)) else {
            return;
        };

        body.passive = step.passive;
        if step.passive {
            return;
        }

        let ratio = if end {
            if d == 0.0 {
                1.0
            } else {
                t / d
            }
        } else if step.duration == 0.0 {
            1.0
        } else {
            (t - step.start) / step.duration
        };
        let ratio = step.ease.map_or(ratio, |ease| ease.apply(ratio));

        'props: for (name, from) in prev.props.iter() {
            let mut value = match step.props.get(name) {
                Some(to) => from.interpolate(to, ratio),
                None => from.clone(),
            };
            for plugin in body.plugins.iter() {
                let mut cx = PluginContext {
                    tween: id,
                    target: Some(&**target),
                    data: &mut body.plugin_data,
                };
                match plugin.change(&mut cx, step, name, &value, ratio, end) {
                    PluginChange::Pass => {}
                    PluginChange::Override(v) => value = v,
                    PluginChange::Ignore => continue 'props,
                }
            }
            target.set(name, value);
        }
    }
}

/// Chained authoring for one tween
///
/// Every call appends at the tween's current duration.
pub struct TweenBuilder<'a> {
    scheduler: &'a mut Scheduler,
    id: TweenId,
}

impl<'a> TweenBuilder<'a> {
    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn scheduler(&mut self) -> &mut Scheduler {
        self.scheduler
    }

    /// Builder: hold the current values for `duration`
    ///
    /// Non-positive durations are ignored.
    pub fn wait(self, duration: f64) -> Self {
        self.scheduler.tween_wait(self.id, duration, false);
        self
    }

    /// Builder: wait without writing properties while the wait is active
    pub fn wait_passive(self, duration: f64) -> Self {
        self.scheduler.tween_wait(self.id, duration, true);
        self
    }

    /// Builder: interpolate linearly to `props` over `duration`
    ///
    /// Negative durations are clamped to zero; a zero duration jumps.
    pub fn to(self, props: PropMap, duration: f64) -> Self {
        self.scheduler.tween_to(self.id, &props, duration, None);
        self
    }

    /// Builder: interpolate to `props` with an easing curve
    pub fn to_eased(self, props: PropMap, duration: f64, ease: Easing) -> Self {
        self.scheduler.tween_to(self.id, &props, duration, Some(ease));
        self
    }

    /// Builder: label the current duration
    pub fn label(self, name: impl Into<String>) -> Self {
        if let Some(entry) = self.scheduler.tweens.get_mut(self.id) {
            let position = entry.duration;
            entry.add_label(name, position);
        }
        self
    }

    /// Builder: queue a callback
    pub fn call<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Scheduler, &ActionCall<'_>) + 'static,
    {
        self.call_with(callback, Vec::new(), None)
    }

    /// Builder: queue a callback with arguments and an explicit scope
    ///
    /// The scope defaults to the tween's target.
    pub fn call_with<F>(self, callback: F, args: Vec<Value>, scope: Option<TargetId>) -> Self
    where
        F: Fn(&mut Scheduler, &ActionCall<'_>) + 'static,
    {
        self.scheduler.add_action(
            self.id,
            ActionKind::Call {
                callback: Rc::new(callback),
                args,
                scope,
            },
        );
        self
    }

    /// Builder: queue a direct property write on the tween's target
    pub fn set(self, props: PropMap) -> Self {
        self.scheduler
            .add_action(self.id, ActionKind::Set { props, target: None });
        self
    }

    /// Builder: queue a direct property write on another target
    pub fn set_on(self, props: PropMap, target: TargetId) -> Self {
        self.scheduler.add_action(
            self.id,
            ActionKind::Set {
                props,
                target: Some(target),
            },
        );
        self
    }

    /// Builder: queue resuming a temporal object (this tween by default)
    pub fn play(self, tween: impl Into<Option<TweenId>>) -> Self {
        let tween = tween.into().unwrap_or(self.id);
        self.scheduler.add_action(
            self.id,
            ActionKind::Paused {
                tween,
                paused: false,
            },
        );
        self
    }

    /// Builder: queue pausing a temporal object (this tween by default)
    pub fn pause(self, tween: impl Into<Option<TweenId>>) -> Self {
        let tween = tween.into().unwrap_or(self.id);
        self.scheduler
            .add_action(self.id, ActionKind::Paused { tween, paused: true });
        self
    }
}
