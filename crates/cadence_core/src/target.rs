//! Tween targets
//!
//! Anything a tween writes into implements [`Animatable`]. Property reads
//! happen once at authoring time (to capture initial values); writes happen
//! on every position update.

use crate::value::{PropMap, Value};

/// An object whose named properties can be animated
pub trait Animatable {
    /// Read the current value of a property, `None` if the property is unknown
    fn get(&self, name: &str) -> Option<Value>;

    /// Write a property
    fn set(&mut self, name: &str, value: Value);
}

/// A plain named-property target
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    props: PropMap,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a property
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Get a numeric property
    pub fn number(&self, name: &str) -> Option<f64> {
        self.props.get(name).and_then(Value::as_number)
    }

    /// Borrow the underlying properties
    pub fn props(&self) -> &PropMap {
        &self.props
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl From<PropMap> for PropertyBag {
    fn from(props: PropMap) -> Self {
        Self { props }
    }
}

impl Animatable for PropertyBag {
    fn get(&self, name: &str) -> Option<Value> {
        self.props.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: Value) {
        match self.props.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.props.insert(name.to_string(), value);
            }
        }
    }
}
