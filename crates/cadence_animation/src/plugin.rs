//! Tween plugins
//!
//! Plugins are installed on a [`Scheduler`](crate::Scheduler) and captured by
//! every tween created afterwards. A tween consults its plugins at three
//! points: when a property is first authored (`init`), after every `to` step
//! is appended (`step`), and for every property write during playback
//! (`change`).
//!
//! Plugins are ordered by ascending priority, ties in installation order.
//! `change` runs in that order; `init` and `step` run from the highest
//! priority down.

use crate::ledger::Step;
use crate::scheduler::TweenId;
use cadence_core::{Animatable, PropMap, Value};
use rustc_hash::FxHashMap;

/// Per-tween plugin settings and scratch state
pub type PluginData = FxHashMap<String, Value>;

/// Result of [`TweenPlugin::init`]
#[derive(Clone, Debug, PartialEq)]
pub enum PluginInit {
    /// Keep the current initial value
    Pass,
    /// Use this initial value instead of reading the target
    Value(Value),
    /// Do not manage this property at all
    Ignore,
}

/// Result of [`TweenPlugin::change`]
#[derive(Clone, Debug, PartialEq)]
pub enum PluginChange {
    /// Keep the computed value
    Pass,
    /// Write this value instead
    Override(Value),
    /// Skip the write for this property
    Ignore,
}

/// What a plugin can see of the tween it is serving
pub struct PluginContext<'a> {
    pub tween: TweenId,
    pub target: Option<&'a dyn Animatable>,
    pub data: &'a mut PluginData,
}

impl PluginContext<'_> {
    /// Whether a boolean flag is set in the tween's plugin data
    pub fn flag(&self, key: &str) -> bool {
        self.data
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A freshly appended step, open for editing
pub struct StepEdit<'a> {
    pub index: usize,
    /// Snapshot the step starts from
    pub start: &'a PropMap,
    /// Snapshot the step ends at (editable)
    pub end: &'a mut PropMap,
    pub(crate) injected: &'a mut PropMap,
}

impl StepEdit<'_> {
    /// Queue an extra property for this step
    ///
    /// Injected properties go through normal initialization once every
    /// plugin has seen the step.
    pub fn inject(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.injected.insert(name.into(), value.into());
    }
}

/// A tween extension
pub trait TweenPlugin {
    /// Unique plugin id; installing a second plugin with the same id is a no-op
    fn id(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    /// A property is authored on a tween for the first time
    ///
    /// `value` is the initial value proposed by higher-priority plugins.
    fn init(&self, _cx: &mut PluginContext<'_>, _prop: &str, _value: Option<&Value>) -> PluginInit {
        PluginInit::Pass
    }

    /// A `to` step was appended; `changed` holds the properties it named
    fn step(&self, _cx: &mut PluginContext<'_>, _step: &mut StepEdit<'_>, _changed: &PropMap) {}

    /// A property is about to be written during playback
    fn change(
        &self,
        _cx: &mut PluginContext<'_>,
        _step: &Step,
        _prop: &str,
        _value: &Value,
        _ratio: f64,
        _end: bool,
    ) -> PluginChange {
        PluginChange::Pass
    }
}
