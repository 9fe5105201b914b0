//! Wire protocol handling
//!
//! Only the Carbon plaintext protocol is spoken here: newline-delimited
//! `name value timestamp` records.

mod carbon;

pub use carbon::{
    CarbonFields, parse_line, parse_record, parse_value, split_fields, strip_line_ending,
};

/// Record delimiter of the plaintext protocol
pub const RECORD_DELIMITER: u8 = b'\n';
