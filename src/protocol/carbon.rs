//! Carbon plaintext record parser
//!
//! A record is one line of the form
//!
//! ```text
//! <metric> <value> <timestamp>
//! ```
//!
//! separated by runs of ASCII whitespace. The value is typed by its syntax:
//! anything that parses as a base-10 `i64` is an integer, otherwise it must
//! parse as an `f64`. The timestamp is required but not retained.
//!
//! See <https://graphite.readthedocs.io/en/latest/feeding-carbon.html>

use nom::{
    IResult, Parser,
    bytes::complete::{take_till1, take_while, take_while1},
    combinator::all_consuming,
    sequence::{delimited, preceded},
};

use crate::datapoint::{Datapoint, Value};
use crate::deconstructor::{Deconstruct, MetricDeconstructor};
use crate::error::ParseError;

/// Raw fields of a Carbon record, borrowed from the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarbonFields<'a> {
    pub metric: &'a str,
    pub value: &'a str,
    pub timestamp: &'a str,
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_ascii_whitespace()).parse(input)
}

fn separator(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_whitespace()).parse(input)
}

fn padding(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_whitespace()).parse(input)
}

fn carbon_fields(input: &str) -> IResult<&str, (&str, &str, &str)> {
    all_consuming(delimited(
        padding,
        (field, preceded(separator, field), preceded(separator, field)),
        padding,
    ))
    .parse(input)
}

/// Split a line into its three fields
///
/// Any other number of fields is a [`ParseError::FieldCount`].
pub fn split_fields(line: &str) -> Result<CarbonFields<'_>, ParseError> {
    match carbon_fields(line) {
        Ok((_, (metric, value, timestamp))) => Ok(CarbonFields {
            metric,
            value,
            timestamp,
        }),
        Err(_) => Err(ParseError::FieldCount(
            line.split_ascii_whitespace().count(),
        )),
    }
}

/// Classify a value token as integer or floating point
///
/// # Examples
///
/// ```
/// use carbon_listener::datapoint::Value;
/// use carbon_listener::protocol::parse_value;
///
/// assert_eq!(parse_value("3").unwrap(), Value::Int(3));
/// assert_eq!(parse_value("3.5").unwrap(), Value::Float(3.5));
/// assert!(parse_value("three").is_err());
/// ```
pub fn parse_value(token: &str) -> Result<Value, ParseError> {
    if let Ok(v) = token.parse::<i64>() {
        return Ok(Value::Int(v));
    }
    token
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| ParseError::InvalidValue(token.to_string()))
}

/// Parse one line (without its delimiter) into a datapoint
pub fn parse_line(
    line: &str,
    deconstructor: &MetricDeconstructor,
) -> Result<Datapoint, ParseError> {
    let fields = split_fields(line)?;
    let value = parse_value(fields.value)?;
    let name = deconstructor.deconstruct(fields.metric)?;
    Ok(Datapoint::new(name.metric, name.dimensions, value))
}

/// Parse one raw record into a datapoint
///
/// # Examples
///
/// ```
/// use carbon_listener::deconstructor::MetricDeconstructor;
/// use carbon_listener::protocol::parse_record;
///
/// let dp = parse_record(b"ametric 2 2", &MetricDeconstructor::default()).unwrap();
/// assert_eq!(dp.metric(), "ametric");
/// assert_eq!(dp.value().as_i64(), Some(2));
/// ```
pub fn parse_record(
    record: &[u8],
    deconstructor: &MetricDeconstructor,
) -> Result<Datapoint, ParseError> {
    let line = std::str::from_utf8(record).map_err(|_| ParseError::NotUtf8)?;
    parse_line(line, deconstructor)
}

/// Strip a trailing `\n` (and a `\r` before it) from a record
#[inline]
pub fn strip_line_ending(record: &[u8]) -> &[u8] {
    let record = record.strip_suffix(b"\n").unwrap_or(record);
    record.strip_suffix(b"\r").unwrap_or(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn identity() -> MetricDeconstructor {
        MetricDeconstructor::default()
    }

    #[test]
    fn test_split_fields() {
        let fields = split_fields("ametric 2 1500000000").unwrap();
        assert_eq!(
            fields,
            CarbonFields {
                metric: "ametric",
                value: "2",
                timestamp: "1500000000",
            }
        );
    }

    #[test]
    fn test_split_fields_tolerates_extra_whitespace() {
        let fields = split_fields("  ametric\t 2   3 \r").unwrap();
        assert_eq!(fields.metric, "ametric");
        assert_eq!(fields.value, "2");
        assert_eq!(fields.timestamp, "3");
    }

    #[test]
    fn test_field_count_errors() {
        assert_eq!(split_fields(""), Err(ParseError::FieldCount(0)));
        assert_eq!(split_fields("INVALIDLINE"), Err(ParseError::FieldCount(1)));
        assert_eq!(split_fields("a 1"), Err(ParseError::FieldCount(2)));
        assert_eq!(split_fields("a 1 2 3"), Err(ParseError::FieldCount(4)));
    }

    #[test]
    fn test_integer_value() {
        let dp = parse_line("ametric 2 2", &identity()).unwrap();
        assert_eq!(dp.metric(), "ametric");
        assert_eq!(dp.value(), Value::Int(2));
        assert!(dp.dimensions().is_empty());
    }

    #[test]
    fn test_negative_integer_value() {
        assert_eq!(parse_value("-42").unwrap(), Value::Int(-42));
    }

    #[test]
    fn test_float_value() {
        assert_eq!(parse_value("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(parse_value("1e3").unwrap(), Value::Float(1000.0));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let value = parse_value("9223372036854775808").unwrap();
        assert!(!value.is_int());
    }

    #[test]
    fn test_invalid_value() {
        assert_eq!(
            parse_line("ametric abc 2", &identity()),
            Err(ParseError::InvalidValue("abc".to_string()))
        );
    }

    #[test]
    fn test_timestamp_not_validated() {
        assert!(parse_line("ametric 1 now", &identity()).is_ok());
    }

    #[test]
    fn test_commakeys_dimensions() {
        let commakeys = MetricDeconstructor::load("commakeys", "").unwrap();
        let dp = parse_line("a.metric.name[host:bob,type:dev] 3 3", &commakeys).unwrap();
        assert_eq!(dp.metric(), "a.metric.name");
        assert_eq!(
            dp.dimensions(),
            &HashMap::from([
                ("host".to_string(), "bob".to_string()),
                ("type".to_string(), "dev".to_string()),
            ])
        );
        assert_eq!(dp.value(), Value::Int(3));
    }

    #[test]
    fn test_deconstruct_failure_is_parse_error() {
        let commakeys = MetricDeconstructor::load("commakeys", "").unwrap();
        assert!(matches!(
            parse_line("m[host 1 2", &commakeys),
            Err(ParseError::Deconstruct(_))
        ));
    }

    #[test]
    fn test_not_utf8() {
        assert_eq!(
            parse_record(b"\xff\xfe 1 2", &identity()),
            Err(ParseError::NotUtf8)
        );
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending(b"a 1 2\n"), b"a 1 2");
        assert_eq!(strip_line_ending(b"a 1 2\r\n"), b"a 1 2");
        assert_eq!(strip_line_ending(b"a 1 2"), b"a 1 2");
        assert_eq!(strip_line_ending(b"\n"), b"");
    }
}
