//! End-to-end playback through the public scheduler API

use cadence_animation::{
    event_tween, ActionCall, PluginChange, PluginContext, PluginInit, Scheduler, SchedulerConfig,
    Step, StepEdit, TargetId, TweenConfig, TweenId, TweenPlugin,
};
use cadence_core::{props, PropMap, PropertyBag, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn paused() -> TweenConfig {
    TweenConfig::new().with_paused(true)
}

fn with_x(scheduler: &mut Scheduler, x: f64) -> TargetId {
    scheduler.add_target(PropertyBag::from(props! { "x" => x }))
}

fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    (count.clone(), count)
}

fn position(scheduler: &Scheduler, id: TweenId) -> Option<f64> {
    scheduler.get(id).map(|t| t.position())
}

fn mark(log: &Rc<RefCell<Vec<u32>>>, at: u32) -> impl Fn(&mut Scheduler, &ActionCall<'_>) + 'static {
    let log = log.clone();
    move |_, _| log.borrow_mut().push(at)
}

/// Tween of duration 100 with recording actions at 0, 50 and 100
fn recorder(scheduler: &mut Scheduler, config: TweenConfig) -> (TweenId, Rc<RefCell<Vec<u32>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let id = scheduler
        .tween_with(None, config)
        .call(mark(&log, 0))
        .wait(50.0)
        .call(mark(&log, 50))
        .wait(50.0)
        .call(mark(&log, 100))
        .id();
    (id, log)
}

#[test]
fn test_half_way_through_a_single_step() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let (completes, seen) = counter();
    let id = scheduler.tween(target).to(props! { "x" => 10.0 }, 1000.0).id();
    scheduler.on_complete(id, move |_, _| seen.set(seen.get() + 1));

    let ended = scheduler.advance(id, 500.0);

    assert!(!ended);
    assert_eq!(scheduler.number(target, "x"), Some(5.0));
    assert_eq!(position(&scheduler, id), Some(500.0));
    assert_eq!(completes.get(), 0);
}

#[test]
fn test_single_loop_wraps_then_ends() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let (completes, seen) = counter();
    let id = scheduler
        .tween_with(target, TweenConfig::new().with_loop(1))
        .to(props! { "x" => 10.0 }, 1000.0)
        .id();
    scheduler.on_complete(id, move |_, _| seen.set(seen.get() + 1));

    assert!(!scheduler.advance(id, 1000.0));
    assert_eq!(position(&scheduler, id), Some(0.0));
    assert_eq!(scheduler.number(target, "x"), Some(0.0));
    assert_eq!(completes.get(), 0);

    assert!(scheduler.advance(id, 1000.0));
    assert_eq!(position(&scheduler, id), Some(1000.0));
    assert_eq!(scheduler.number(target, "x"), Some(10.0));
    assert_eq!(completes.get(), 1);
    assert!(scheduler.get(id).is_some_and(|t| t.is_paused()));
}

#[test]
fn test_past_the_end_is_idempotent() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let (changes, seen) = counter();
    let id = scheduler
        .tween_with(target, paused())
        .to(props! { "x" => 10.0 }, 1000.0)
        .id();
    scheduler.on_change(id, move |_, _| seen.set(seen.get() + 1));

    for raw in [1000.0, 1000.0, 4000.0] {
        assert!(scheduler.set_position(id, raw));
        assert_eq!(position(&scheduler, id), Some(1000.0));
    }
    assert_eq!(changes.get(), 1);
}

#[test]
fn test_bounce_odd_loops_mirror_position() {
    let mut scheduler = Scheduler::new();
    let id = scheduler
        .tween_with(None, paused().with_infinite_loop().with_bounce(true))
        .wait(1000.0)
        .id();

    for raw in [1250.0, 3600.0, 7001.0] {
        scheduler.set_position(id, raw);
        assert_eq!(position(&scheduler, id), Some(1000.0 - raw % 1000.0));
    }
}

#[test]
fn test_repeated_target_value_holds_through_second_step() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let id = scheduler
        .tween_with(target, paused())
        .to(props! { "x" => 100.0 }, 1000.0)
        .to(props! { "x" => 100.0 }, 1000.0)
        .id();

    for raw in [1000.0, 1250.0, 1999.0] {
        scheduler.set_position(id, raw);
        assert_eq!(scheduler.number(target, "x"), Some(100.0));
    }
}

#[test]
fn test_zero_duration_jumps_on_first_update() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let (changes, seen) = counter();
    let id = scheduler
        .tween_with(target, paused())
        .to(props! { "x" => 5.0 }, 0.0)
        .id();
    scheduler.on_change(id, move |_, _| seen.set(seen.get() + 1));

    assert!(scheduler.set_position(id, 0.0));
    assert_eq!(scheduler.number(target, "x"), Some(5.0));

    assert!(scheduler.set_position(id, 300.0));
    assert_eq!(changes.get(), 1);
    assert_eq!(position(&scheduler, id), Some(0.0));
}

#[test]
fn test_labels_resolve_and_seek() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let id = scheduler
        .tween_with(target, paused())
        .to(props! { "x" => 10.0 }, 1000.0)
        .id();
    if let Some(tween) = scheduler.get_mut(id) {
        tween.add_label("mid", 500.0);
    }

    let tween = scheduler.get(id);
    assert_eq!(tween.and_then(|t| t.resolve("mid")), Some(500.0));
    assert_eq!(tween.and_then(|t| t.resolve("missing")), None);

    assert!(scheduler.goto_and_play(id, "mid"));
    assert_eq!(scheduler.number(target, "x"), Some(5.0));
    assert_eq!(
        scheduler.get(id).and_then(|t| t.current_label().map(String::from)),
        Some("mid".to_string())
    );
    assert!(scheduler.has_active_tweens(Some(target)));
}

#[test]
fn test_timeline_forwards_position_to_children() {
    let mut scheduler = Scheduler::new();
    let short = scheduler.tween_with(None, paused()).wait(1000.0).id();
    let long = scheduler.tween_with(None, paused()).wait(2000.0).id();
    let timeline = scheduler.create_timeline(&[short, long], paused());

    assert_eq!(scheduler.get(timeline).map(|t| t.duration()), Some(2000.0));

    scheduler.set_position(timeline, 1500.0);
    assert_eq!(position(&scheduler, timeline), Some(1500.0));
    assert_eq!(position(&scheduler, short), Some(1000.0));
    assert_eq!(position(&scheduler, long), Some(1500.0));
}

#[test]
fn test_timeline_replays_child_actions_once() {
    let mut scheduler = Scheduler::new();
    let (calls, seen) = counter();
    let child = scheduler
        .tween_with(None, paused())
        .wait(500.0)
        .call(move |_, _| seen.set(seen.get() + 1))
        .wait(500.0)
        .id();
    let timeline = scheduler.create_timeline(&[child], paused());

    scheduler.advance(timeline, 400.0);
    assert_eq!(calls.get(), 0);
    scheduler.advance(timeline, 200.0);
    assert_eq!(calls.get(), 1);

    // Moving back over the action replays it in reverse
    scheduler.set_position(timeline, 100.0);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_action_replay_across_loops() {
    struct Case {
        name: &'static str,
        config: TweenConfig,
        steps: usize,
        delta: f64,
        expected: Vec<u32>,
    }

    let cases = vec![
        Case {
            name: "single pass",
            config: paused(),
            steps: 4,
            delta: 25.0,
            expected: vec![0, 50, 100],
        },
        Case {
            name: "two passes",
            config: paused().with_loop(1),
            steps: 4,
            delta: 50.0,
            expected: vec![0, 50, 100, 0, 50, 100],
        },
        Case {
            name: "two passes in one jump",
            config: paused().with_loop(1),
            steps: 1,
            delta: 200.0,
            expected: vec![0, 50, 100, 0, 50, 100],
        },
        Case {
            name: "bounce",
            config: paused().with_loop(1).with_bounce(true),
            steps: 4,
            delta: 50.0,
            expected: vec![0, 50, 100, 50, 0],
        },
        Case {
            name: "reversed",
            config: paused().with_reversed(true),
            steps: 4,
            delta: 25.0,
            expected: vec![100, 50, 0],
        },
        Case {
            name: "reversed bounce",
            config: paused().with_loop(1).with_bounce(true).with_reversed(true),
            steps: 4,
            delta: 50.0,
            expected: vec![100, 50, 0, 50, 100],
        },
    ];

    for case in cases {
        let mut scheduler = Scheduler::new();
        let (id, log) = recorder(&mut scheduler, case.config);
        for _ in 0..case.steps {
            scheduler.advance(id, case.delta);
        }
        assert_eq!(*log.borrow(), case.expected, "{}", case.name);
    }
}

#[test]
fn test_backwards_seek_replays_in_reverse_order() {
    let mut scheduler = Scheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut builder = scheduler.tween_with(None, paused()).wait(25.0);
    for at in [25, 50, 75] {
        let log = log.clone();
        builder = builder
            .call(move |_, _| log.borrow_mut().push(at))
            .wait(25.0);
    }
    let id = builder.id();

    scheduler.set_position(id, 100.0);
    scheduler.set_position(id, 0.0);
    assert_eq!(*log.borrow(), vec![25, 50, 75, 75, 50, 25]);
}

#[test]
fn test_seek_inside_action_aborts_replay() {
    let mut scheduler = Scheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (first, second) = (log.clone(), log.clone());
    let id = scheduler
        .tween_with(None, paused())
        .wait(50.0)
        .call(move |s, call| {
            first.borrow_mut().push("seek");
            s.set_position_with(call.tween, 10.0, true, false, None);
        })
        .wait(50.0)
        .call(move |_, _| second.borrow_mut().push("end"))
        .id();

    scheduler.set_position(id, 100.0);
    assert_eq!(*log.borrow(), vec!["seek"]);
    assert_eq!(position(&scheduler, id), Some(10.0));
}

#[test]
fn test_play_and_pause_actions() {
    let mut scheduler = Scheduler::new();
    let other = scheduler.tween_with(None, paused()).wait(100.0).id();
    let id = scheduler
        .tween_with(None, paused())
        .wait(50.0)
        .play(other)
        .pause(None)
        .wait(50.0)
        .id();

    scheduler.play(id);
    scheduler.advance(id, 60.0);
    assert!(scheduler.get(other).is_some_and(|t| !t.is_paused()));
    assert!(scheduler.get(id).is_some_and(|t| t.is_paused()));
    assert_eq!(scheduler.active_tweens().collect::<Vec<_>>(), vec![other]);
}

#[test]
fn test_tick_drives_active_tweens_until_complete() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let (completes, seen) = counter();
    let id = scheduler
        .tween_with(
            target,
            TweenConfig::new().on_complete(move |_, _| seen.set(seen.get() + 1)),
        )
        .to(props! { "x" => 100.0 }, 100.0)
        .id();

    scheduler.tick(60.0, false);
    assert_eq!(scheduler.number(target, "x"), Some(60.0));
    scheduler.tick(60.0, false);
    scheduler.tick(60.0, false);

    assert_eq!(scheduler.number(target, "x"), Some(100.0));
    assert_eq!(completes.get(), 1);
    assert!(!scheduler.has_active_tweens(None));
    assert!(scheduler.get(id).is_some_and(|t| t.is_paused()));
}

#[test]
fn test_tick_honors_ticks_scale_and_global_pause() {
    let mut scheduler = Scheduler::new();
    let by_ticks = scheduler
        .tween_with(None, TweenConfig::new().with_ticks(true))
        .wait(10.0)
        .id();
    let scaled = scheduler
        .tween_with(None, TweenConfig::new().with_time_scale(2.0))
        .wait(1000.0)
        .id();
    let unstoppable = scheduler
        .tween_with(None, TweenConfig::new().with_ignore_global_pause(true))
        .wait(1000.0)
        .id();

    scheduler.tick(16.0, false);
    assert_eq!(position(&scheduler, by_ticks), Some(1.0));
    assert_eq!(position(&scheduler, scaled), Some(32.0));
    assert_eq!(position(&scheduler, unstoppable), Some(16.0));

    scheduler.tick(16.0, true);
    assert_eq!(position(&scheduler, by_ticks), Some(1.0));
    assert_eq!(position(&scheduler, scaled), Some(32.0));
    assert_eq!(position(&scheduler, unstoppable), Some(32.0));
}

#[test]
fn test_complete_listener_can_restart() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let id = scheduler.tween(target).to(props! { "x" => 10.0 }, 100.0).id();
    scheduler.on_complete(id, |s, event| {
        s.goto_and_play(event_tween(event), 0.0);
    });

    scheduler.tick(150.0, false);
    assert_eq!(position(&scheduler, id), Some(0.0));
    assert_eq!(scheduler.number(target, "x"), Some(0.0));
    assert!(scheduler.get(id).is_some_and(|t| !t.is_paused()));
}

#[test]
fn test_initial_position_from_config() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let id = scheduler
        .tween_with(target, paused())
        .to(props! { "x" => 10.0 }, 1000.0)
        .id();
    let timeline = scheduler.create_timeline(&[id], paused().with_position(700.0));

    assert_eq!(position(&scheduler, timeline), Some(700.0));
    assert_eq!(scheduler.number(target, "x"), Some(7.0));
}

#[test]
fn test_tick_elapsed_clamps_delta() {
    let mut scheduler = Scheduler::with_config(SchedulerConfig::default().with_max_delta(0.0));
    let id = scheduler.tween(None).wait(100.0).id();

    assert_eq!(scheduler.tick_elapsed(false), 0.0);
    assert_eq!(position(&scheduler, id), Some(0.0));

    let mut scheduler = Scheduler::with_config(SchedulerConfig::default().with_target_fps(50));
    let id = scheduler.tween(None).wait(100.0).id();
    scheduler.tick_frame(false);
    assert_eq!(position(&scheduler, id), Some(20.0));
}

struct Doubling;

impl TweenPlugin for Doubling {
    fn id(&self) -> &'static str {
        "Doubling"
    }

    fn init(&self, _cx: &mut PluginContext<'_>, prop: &str, _value: Option<&Value>) -> PluginInit {
        match prop {
            "secret" => PluginInit::Ignore,
            "y" => PluginInit::Value(Value::from(100.0)),
            _ => PluginInit::Pass,
        }
    }

    fn step(&self, _cx: &mut PluginContext<'_>, step: &mut StepEdit<'_>, changed: &PropMap) {
        if let Some(x) = changed.get("x").and_then(Value::as_number) {
            step.inject("y", x * 2.0);
        }
    }

    fn change(
        &self,
        _cx: &mut PluginContext<'_>,
        _step: &Step,
        prop: &str,
        value: &Value,
        _ratio: f64,
        _end: bool,
    ) -> PluginChange {
        match (prop, value.as_number()) {
            ("x", Some(x)) => PluginChange::Override(Value::from(x + 1.0)),
            _ => PluginChange::Pass,
        }
    }
}

#[test]
fn test_plugin_hooks() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let before = scheduler.tween_with(target, paused()).id();
    scheduler.install_plugin(Doubling);

    let id = scheduler
        .tween_with(target, paused())
        .to(props! { "x" => 10.0, "secret" => 5.0 }, 100.0)
        .id();
    scheduler.set_position(id, 50.0);

    assert_eq!(scheduler.number(target, "x"), Some(6.0));
    assert_eq!(scheduler.number(target, "y"), Some(60.0));
    assert_eq!(scheduler.value(target, "secret"), None);

    // Tweens created before installation keep their plugin list
    scheduler.edit(before).to(props! { "x" => 20.0 }, 100.0);
    scheduler.set_position(before, 50.0);
    assert_eq!(scheduler.number(target, "x"), Some(13.0));
}

#[test]
fn test_jump_fires_at_the_bounced_destination() {
    let mut scheduler = Scheduler::new();
    let (id, log) = recorder(&mut scheduler, paused().with_loop(3).with_bounce(true));

    // Loop 1 plays backwards: raw 130 sits at 70, no action there
    scheduler.set_position_with(id, 130.0, false, true, None);
    assert_eq!(*log.borrow(), Vec::<u32>::new());

    scheduler.set_position_with(id, 150.0, false, true, None);
    assert_eq!(*log.borrow(), vec![50]);

    // Start of loop 2, forward again
    scheduler.set_position_with(id, 200.0, false, true, None);
    assert_eq!(*log.borrow(), vec![50, 0]);
}

#[test]
fn test_timeline_label_jump_fires_only_destination() {
    let mut scheduler = Scheduler::new();
    let (child, log) = recorder(&mut scheduler, paused());
    let timeline = scheduler.create_timeline(&[child], paused().with_label("mid", 50.0));

    assert!(scheduler.goto_and_stop(timeline, "mid"));
    assert_eq!(*log.borrow(), vec![50]);
    assert_eq!(position(&scheduler, child), Some(50.0));
    assert!(scheduler.get(timeline).is_some_and(|t| t.is_paused()));
}

#[test]
fn test_huge_raw_position_keeps_values_in_range() {
    let mut scheduler = Scheduler::new();
    let target = with_x(&mut scheduler, 0.0);
    let id = scheduler
        .tween_with(target, paused().with_infinite_loop())
        .to(props! { "x" => 1.0 }, 10.0)
        .id();

    for raw in [1e20, f64::INFINITY] {
        scheduler.set_position_with(id, raw, true, false, None);
        let at = position(&scheduler, id).unwrap_or(f64::NAN);
        assert!((0.0..=10.0).contains(&at), "{raw}");
        let x = scheduler.number(target, "x").unwrap_or(f64::NAN);
        assert!((0.0..=1.0).contains(&x), "{raw}");
    }
}
