//! Shared helper types

pub mod duration;

pub use duration::{option_millis_serde, option_secs_serde};
