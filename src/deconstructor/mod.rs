//! Metric name deconstruction strategies
//!
//! A deconstructor turns the raw metric token of a Carbon record into a base
//! metric name plus a set of dimensions. Strategies are selected by name when
//! a listener is built:
//!
//! | selector            | strategy                                   |
//! |---------------------|--------------------------------------------|
//! | `""`, `"identity"`  | [`Identity`]: token unchanged, no dimensions |
//! | `"commakeys"`       | [`CommaKeys`]: `base[key:value,key:value]`  |

mod comma_keys;
mod identity;

pub use comma_keys::CommaKeys;
pub use identity::Identity;

use std::collections::HashMap;

use crate::error::{ConfigError, DeconstructError};

/// Base metric name and the dimensions split out of a raw metric token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeconstructedName {
    pub metric: String,
    pub dimensions: HashMap<String, String>,
}

impl DeconstructedName {
    /// A name with no dimensions
    #[must_use]
    pub fn bare(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            dimensions: HashMap::new(),
        }
    }
}

/// A strategy for splitting raw metric tokens
pub trait Deconstruct {
    fn deconstruct(&self, raw: &str) -> Result<DeconstructedName, DeconstructError>;
}

/// The set of known deconstruction strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricDeconstructor {
    Identity(Identity),
    CommaKeys(CommaKeys),
}

impl MetricDeconstructor {
    pub const IDENTITY: &'static str = "identity";
    pub const COMMA_KEYS: &'static str = "commakeys";

    /// Resolve a strategy by selector name and strategy-specific options
    ///
    /// An empty selector always resolves to [`Identity`].
    ///
    /// # Examples
    ///
    /// ```
    /// use carbon_listener::deconstructor::{Deconstruct, MetricDeconstructor};
    ///
    /// let commakeys = MetricDeconstructor::load("commakeys", "").unwrap();
    /// let name = commakeys.deconstruct("cpu.idle[host:bob]").unwrap();
    /// assert_eq!(name.metric, "cpu.idle");
    /// assert_eq!(name.dimensions["host"], "bob");
    ///
    /// assert!(MetricDeconstructor::load("UNKNOWN", "").is_err());
    /// ```
    pub fn load(name: &str, options: &str) -> Result<Self, ConfigError> {
        match name {
            "" | Self::IDENTITY => Identity::from_options(options).map(Self::Identity),
            Self::COMMA_KEYS => CommaKeys::from_options(options).map(Self::CommaKeys),
            other => Err(ConfigError::UnknownDeconstructor(other.to_string())),
        }
    }

    /// Selector name of this strategy
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identity(_) => Self::IDENTITY,
            Self::CommaKeys(_) => Self::COMMA_KEYS,
        }
    }
}

impl Default for MetricDeconstructor {
    fn default() -> Self {
        Self::Identity(Identity)
    }
}

impl Deconstruct for MetricDeconstructor {
    #[inline]
    fn deconstruct(&self, raw: &str) -> Result<DeconstructedName, DeconstructError> {
        match self {
            Self::Identity(d) => d.deconstruct(raw),
            Self::CommaKeys(d) => d.deconstruct(raw),
        }
    }
}

impl std::fmt::Display for MetricDeconstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
