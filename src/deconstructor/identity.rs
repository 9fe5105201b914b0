use super::{Deconstruct, DeconstructedName};
use crate::error::{ConfigError, DeconstructError};

/// Passes the metric token through untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identity;

impl Identity {
    pub(super) fn from_options(options: &str) -> Result<Self, ConfigError> {
        if options.is_empty() {
            Ok(Self)
        } else {
            Err(ConfigError::InvalidDeconstructorOptions {
                name: super::MetricDeconstructor::IDENTITY.to_string(),
                options: options.to_string(),
            })
        }
    }
}

impl Deconstruct for Identity {
    #[inline]
    fn deconstruct(&self, raw: &str) -> Result<DeconstructedName, DeconstructError> {
        Ok(DeconstructedName::bare(raw))
    }
}
