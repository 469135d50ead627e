//! Cadence Animation System
//!
//! Tweens, timelines, and the scheduler that drives them.
//!
//! # Features
//!
//! - **Tweens**: Queued waits, interpolations, and actions for one target
//! - **Timelines**: Group temporal objects under a single position
//! - **Looping**: Finite or infinite loops, bounce, and reversal
//! - **Labels**: Named positions for `goto_and_play` / `goto_and_stop`
//! - **Plugins**: Hooks into property initialization, authoring, and writes
//! - **Registry**: One `tick` advances every active object
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{Scheduler, TweenConfig};
//! use cadence_core::{props, PropertyBag};
//!
//! let mut scheduler = Scheduler::new();
//! let sprite = scheduler.add_target(PropertyBag::from(props! { "x" => 0.0 }));
//!
//! scheduler
//!     .tween_with(sprite, TweenConfig::new().with_loop(1))
//!     .to(props! { "x" => 10.0 }, 1000.0);
//!
//! scheduler.tick(250.0, false);
//! assert_eq!(scheduler.number(sprite, "x"), Some(2.5));
//! ```

pub mod easing;
pub mod engine;
pub mod labels;
pub mod ledger;
pub mod plugin;
pub mod position;
pub mod rotation;
pub mod scheduler;
pub mod temporal;
pub mod timeline;
pub mod tween;

pub use easing::Easing;
pub use engine::OnUpdated;
pub use labels::{Label, LabelTable, Seek};
pub use ledger::{Action, ActionCall, ActionFn, ActionLedger, Step, StepLedger};
pub use plugin::{PluginChange, PluginContext, PluginData, PluginInit, StepEdit, TweenPlugin};
pub use position::{LoopShape, PositionState};
pub use rotation::RotationPlugin;
pub use scheduler::{
    event_source, event_tween, ClockSource, Scheduler, SchedulerConfig, TargetId, TweenId,
};
pub use temporal::{Temporal, TweenConfig};
pub use tween::TweenBuilder;
