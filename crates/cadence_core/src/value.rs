//! Animatable property values
//!
//! Tweens treat every property as a [`Value`]. Only numeric pairs are
//! interpolated; everything else holds its start value until the segment
//! completes and then snaps to the end value.

use indexmap::IndexMap;
use std::fmt;

/// Ordered map of property name to value
///
/// Insertion order is preserved so property writes happen in the order
/// they were authored.
pub type PropMap = IndexMap<String, Value>;

/// A dynamically typed property value
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing or unset value
    #[default]
    Null,
    /// Numeric value (interpolated)
    Number(f64),
    /// Boolean flag (discrete)
    Bool(bool),
    /// Text value (discrete)
    Text(String),
}

impl Value {
    /// Get the numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean value, if this is a flag
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the text value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpolate from `self` toward `end` by an (already eased) ratio.
    ///
    /// Distinct numeric values are blended linearly. Anything else holds
    /// `self` until `ratio` reaches 1.
    pub fn interpolate(&self, end: &Value, ratio: f64) -> Value {
        match (self, end) {
            (Value::Number(a), Value::Number(b)) if a != b => Value::Number(a + (b - a) * ratio),
            _ if ratio >= 1.0 => end.clone(),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Build a [`PropMap`] from `name => value` pairs
///
/// ```rust
/// use cadence_core::{props, Value};
///
/// let p = props! { "x" => 10.0, "label" => "done" };
/// assert_eq!(p["x"], Value::Number(10.0));
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::value::PropMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::PropMap::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::value::Value::from($value),
            );
        )+
        map
    }};
}
