//! Rotation plugin
//!
//! Rewrites authored rotation end values so every step turns the short way
//! around (at most 180 degrees). A `rotationDir` property on the step forces
//! a direction instead: `1` clockwise, `-1` counter-clockwise, `0` keeps the
//! authored delta as-is. The final update snaps to the authored value.
//!
//! Set `Rotation_disabled` in a tween's plugin data to opt out.

use crate::ledger::Step;
use crate::plugin::{PluginChange, PluginContext, PluginInit, StepEdit, TweenPlugin};
use cadence_core::{PropMap, Value};

pub const ROTATION_PROPS: [&str; 4] = ["rotation", "rotationX", "rotationY", "rotationZ"];

/// Plugin data flag disabling the plugin for one tween
pub const DISABLED_KEY: &str = "Rotation_disabled";

const DIRECTION_PROP: &str = "rotationDir";

fn end_key(prop: &str) -> String {
    format!("Rotation_end:{prop}")
}

fn is_rotation(prop: &str) -> bool {
    ROTATION_PROPS.contains(&prop)
}

/// Shortest-path rotation
#[derive(Clone, Copy, Debug, Default)]
pub struct RotationPlugin;

impl RotationPlugin {
    pub const ID: &'static str = "Rotation";

    pub fn new() -> Self {
        Self
    }
}

impl TweenPlugin for RotationPlugin {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn init(&self, cx: &mut PluginContext<'_>, prop: &str, value: Option<&Value>) -> PluginInit {
        if !is_rotation(prop) || cx.flag(DISABLED_KEY) {
            return PluginInit::Pass;
        }
        let initial = value
            .cloned()
            .or_else(|| cx.target.and_then(|t| t.get(prop)))
            .unwrap_or(Value::Null);
        cx.data.insert(end_key(prop), initial);
        PluginInit::Pass
    }

    fn step(&self, cx: &mut PluginContext<'_>, step: &mut StepEdit<'_>, changed: &PropMap) {
        let direction = step.end.get(DIRECTION_PROP).and_then(Value::as_number);
        for prop in ROTATION_PROPS {
            let Some(value) = changed.get(prop).and_then(Value::as_number) else {
                continue;
            };
            let key = end_key(prop);
            let Some(end) = cx.data.get(&key).and_then(Value::as_number) else {
                continue;
            };
            let start = step
                .start
                .get(prop)
                .and_then(Value::as_number)
                .unwrap_or(end);

            let rewritten = match direction {
                Some(d) if d == 0.0 => value - end + start,
                _ => {
                    let mut delta = (value - start) % 360.0;
                    match direction {
                        None if delta > 180.0 => delta -= 360.0,
                        None if delta < -180.0 => delta += 360.0,
                        Some(d) if d < 0.0 && delta > 0.0 => delta -= 360.0,
                        Some(d) if d > 0.0 && delta < 0.0 => delta += 360.0,
                        _ => {}
                    }
                    start + delta
                }
            };
            step.end.insert(prop.to_string(), Value::from(rewritten));
            cx.data.insert(key, Value::from(value));
        }
    }

    fn change(
        &self,
        cx: &mut PluginContext<'_>,
        step: &Step,
        prop: &str,
        _value: &Value,
        _ratio: f64,
        end: bool,
    ) -> PluginChange {
        if cx.flag(DISABLED_KEY) {
            return PluginChange::Pass;
        }
        if prop == DIRECTION_PROP {
            return PluginChange::Ignore;
        }
        if end && is_rotation(prop) && step.props().contains_key(prop) {
            if let Some(value) = cx.data.get(&end_key(prop)) {
                return PluginChange::Override(value.clone());
            }
        }
        PluginChange::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use crate::temporal::TweenConfig;
    use cadence_core::{props, PropertyBag};

    fn setup(initial: f64) -> (Scheduler, crate::scheduler::TargetId) {
        let mut scheduler = Scheduler::new();
        scheduler.install_plugin(RotationPlugin::new());
        let target = scheduler.add_target(PropertyBag::from(props! { "rotation" => initial }));
        (scheduler, target)
    }

    fn authored_end(scheduler: &Scheduler, id: crate::scheduler::TweenId) -> Option<Value> {
        scheduler
            .get(id)
            .and_then(|t| t.steps())
            .and_then(|s| s.get(1))
            .and_then(|s| s.props().get("rotation").cloned())
    }

    #[test]
    fn test_takes_the_short_way_around() {
        let (mut scheduler, target) = setup(350.0);
        let id = scheduler
            .tween_with(target, TweenConfig::new().with_paused(true))
            .to(props! { "rotation" => 10.0 }, 100.0)
            .id();

        assert_eq!(authored_end(&scheduler, id), Some(Value::from(370.0)));
        scheduler.set_position(id, 50.0);
        assert_eq!(scheduler.number(target, "rotation"), Some(360.0));

        // Snaps to the authored value at the very end
        scheduler.set_position(id, 100.0);
        assert_eq!(scheduler.number(target, "rotation"), Some(10.0));
    }

    #[test]
    fn test_forced_direction() {
        let (mut scheduler, target) = setup(0.0);
        let ccw = scheduler
            .tween_with(target, TweenConfig::new().with_paused(true))
            .to(props! { "rotation" => 90.0, "rotationDir" => -1 }, 100.0)
            .id();
        assert_eq!(authored_end(&scheduler, ccw), Some(Value::from(-270.0)));

        let cw = scheduler
            .tween_with(target, TweenConfig::new().with_paused(true))
            .to(props! { "rotation" => -90.0, "rotationDir" => 1 }, 100.0)
            .id();
        assert_eq!(authored_end(&scheduler, cw), Some(Value::from(270.0)));
    }

    #[test]
    fn test_direction_is_never_written() {
        let (mut scheduler, target) = setup(0.0);
        let id = scheduler
            .tween_with(target, TweenConfig::new().with_paused(true))
            .to(props! { "rotation" => 90.0, "rotationDir" => 1 }, 100.0)
            .id();
        scheduler.set_position(id, 40.0);
        assert_eq!(scheduler.value(target, "rotationDir"), None);
    }

    #[test]
    fn test_disabled_per_tween() {
        let (mut scheduler, target) = setup(350.0);
        let id = scheduler
            .tween_with(
                target,
                TweenConfig::new()
                    .with_paused(true)
                    .with_plugin_data(DISABLED_KEY, true),
            )
            .to(props! { "rotation" => 10.0 }, 100.0)
            .id();

        assert_eq!(authored_end(&scheduler, id), Some(Value::from(10.0)));
        scheduler.set_position(id, 50.0);
        assert_eq!(scheduler.number(target, "rotation"), Some(180.0));
    }

    #[test]
    fn test_disabled_tween_writes_direction() {
        let (mut scheduler, target) = setup(0.0);
        let id = scheduler
            .tween_with(
                target,
                TweenConfig::new()
                    .with_paused(true)
                    .with_plugin_data(DISABLED_KEY, true),
            )
            .to(props! { "rotation" => 90.0, "rotationDir" => 1 }, 100.0)
            .id();

        scheduler.set_position(id, 100.0);
        assert_eq!(scheduler.value(target, "rotationDir"), Some(Value::from(1)));
        assert_eq!(scheduler.number(target, "rotation"), Some(90.0));
    }
}
