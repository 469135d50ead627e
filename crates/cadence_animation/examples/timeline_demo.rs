//! Timeline Demo
//!
//! Drives two sprites through a timeline at 60fps and logs their positions.
//!
//! Run with: cargo run -p cadence_animation --example timeline_demo

use cadence_animation::{Easing, RotationPlugin, Scheduler, SchedulerConfig, TweenConfig};
use cadence_core::{props, PropertyBag};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut scheduler = Scheduler::with_config(SchedulerConfig::default().with_target_fps(60));
    scheduler.install_plugin(RotationPlugin::new());

    let ball = scheduler.add_target(PropertyBag::from(props! { "x" => 0.0, "alpha" => 0.0 }));
    let wheel = scheduler.add_target(PropertyBag::from(props! { "rotation" => 350.0 }));

    let slide = scheduler
        .tween_with(ball, TweenConfig::new().with_loop(1).with_bounce(true))
        .to(props! { "alpha" => 1.0 }, 200.0)
        .label("moving")
        .to_eased(props! { "x" => 300.0 }, 600.0, Easing::EaseInOutCubic)
        .id();
    let spin = scheduler
        .tween(wheel)
        .wait(300.0)
        .to_eased(props! { "rotation" => 10.0 }, 500.0, Easing::EaseOut)
        .call(|_, call| tracing::info!("wheel {:?} settled", call.tween))
        .id();

    let timeline = scheduler.create_timeline(
        &[slide, spin],
        TweenConfig::new().on_complete(|_, _| tracing::info!("timeline complete")),
    );

    let mut frame = 0;
    while scheduler.has_active_tweens(None) {
        scheduler.tick_frame(false);
        frame += 1;
        if frame % 10 == 0 {
            tracing::info!(
                "frame {:>3}  t={:>6.1}  x={:>6.1}  alpha={:.2}  rotation={:>6.1}",
                frame,
                scheduler.get(timeline).map_or(0.0, |t| t.position()),
                scheduler.number(ball, "x").unwrap_or_default(),
                scheduler.number(ball, "alpha").unwrap_or_default(),
                scheduler.number(wheel, "rotation").unwrap_or_default(),
            );
        }
    }
}
