//! Cadence Core Runtime
//!
//! Foundational primitives shared by every Cadence animation type:
//!
//! - **Values**: dynamically typed property values and property maps
//! - **Targets**: the `Animatable` trait that tweens write into
//! - **Event Dispatch**: `change` / `complete` notifications
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{props, Animatable, PropertyBag, Value};
//!
//! let mut bag = PropertyBag::from(props! { "x" => 0.0, "visible" => true });
//! bag.set("x", Value::from(12.5));
//!
//! assert_eq!(bag.number("x"), Some(12.5));
//! assert_eq!(bag.get("visible"), Some(Value::Bool(true)));
//! ```

pub mod error;
pub mod events;
pub mod target;
pub mod value;

pub use error::{CadenceError, Result};
pub use events::{Event, EventDispatcher, EventHandler, EventType};
pub use target::{Animatable, PropertyBag};
pub use value::{PropMap, Value};
