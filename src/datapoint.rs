//! Structured metric observations produced by the listener

use std::collections::HashMap;
use std::fmt;

/// Numeric value of a datapoint, typed by the syntax of the value token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    /// Get the integer value, if this is an integer datapoint
    #[must_use]
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(_) => None,
        }
    }

    /// Get the value as a float (integers are widened)
    #[must_use]
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
        }
    }

    #[must_use]
    #[inline]
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// One metric observation: base name, dimensions and a typed value
///
/// Once handed to a sink the listener never touches it again.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    metric: String,
    dimensions: HashMap<String, String>,
    value: Value,
}

impl Datapoint {
    pub fn new(
        metric: impl Into<String>,
        dimensions: HashMap<String, String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            metric: metric.into(),
            dimensions,
            value: value.into(),
        }
    }

    #[must_use]
    #[inline]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    #[must_use]
    #[inline]
    pub fn dimensions(&self) -> &HashMap<String, String> {
        &self.dimensions
    }

    #[must_use]
    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Split into owned parts
    #[must_use]
    pub fn into_parts(self) -> (String, HashMap<String, String>, Value) {
        (self.metric, self.dimensions, self.value)
    }
}

/// Renders as `metric[key:value,...] value`, dimensions sorted by key
impl fmt::Display for Datapoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.metric)?;
        if !self.dimensions.is_empty() {
            let mut dims: Vec<_> = self.dimensions.iter().collect();
            dims.sort_unstable();
            f.write_str("[")?;
            for (i, (key, value)) in dims.into_iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}:{}", key, value)?;
            }
            f.write_str("]")?;
        }
        write!(f, " {}", self.value)
    }
}
