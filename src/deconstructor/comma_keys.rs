//! `base.name[key:value,key:value]` dimension syntax

use nom::{
    IResult, Parser,
    bytes::complete::{take_till, take_till1},
    character::complete::char,
    combinator::all_consuming,
    sequence::delimited,
};

use super::{Deconstruct, DeconstructedName};
use crate::error::{ConfigError, DeconstructError};

/// Option that splits each pair on its last `:` so keys may contain colons
const COLON_IN_KEY: &str = "coloninkey";

/// Splits a bracketed dimension suffix off the metric name
///
/// Tokens without a `[` are returned as-is with no dimensions. When a key
/// appears twice the last value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommaKeys {
    colon_in_key: bool,
}

impl CommaKeys {
    #[must_use]
    pub const fn new(colon_in_key: bool) -> Self {
        Self { colon_in_key }
    }

    pub(super) fn from_options(options: &str) -> Result<Self, ConfigError> {
        match options {
            "" => Ok(Self::new(false)),
            COLON_IN_KEY => Ok(Self::new(true)),
            other => Err(ConfigError::InvalidDeconstructorOptions {
                name: super::MetricDeconstructor::COMMA_KEYS.to_string(),
                options: other.to_string(),
            }),
        }
    }

    fn split_pair<'a>(&self, pair: &'a str) -> Option<(&'a str, &'a str)> {
        if self.colon_in_key {
            pair.rsplit_once(':')
        } else {
            pair.split_once(':')
        }
    }
}

/// `base[contents]`, with the bracket closing the token
fn bracketed(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming((
        take_till1(|c: char| c == '['),
        delimited(char('['), take_till(|c: char| c == ']'), char(']')),
    ))
    .parse(input)
}

impl Deconstruct for CommaKeys {
    fn deconstruct(&self, raw: &str) -> Result<DeconstructedName, DeconstructError> {
        if !raw.contains('[') {
            return Ok(DeconstructedName::bare(raw));
        }

        let (_, (metric, contents)) =
            bracketed(raw).map_err(|_| DeconstructError::Malformed(raw.to_string()))?;

        let mut name = DeconstructedName::bare(metric);
        if contents.is_empty() {
            return Ok(name);
        }

        for pair in contents.split(',') {
            let (key, value) = self
                .split_pair(pair)
                .ok_or_else(|| DeconstructError::MissingSeparator(pair.to_string()))?;
            if key.is_empty() {
                return Err(DeconstructError::EmptyKey(pair.to_string()));
            }
            name.dimensions.insert(key.to_string(), value.to_string());
        }

        Ok(name)
    }
}
