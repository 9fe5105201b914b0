//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use crate::constants::{listener, sink};

/// Default listener name
#[inline]
pub fn listener_name() -> String {
    listener::DEFAULT_NAME.to_string()
}

/// Default listen address (loopback, Carbon plaintext port)
#[inline]
pub fn listen_addr() -> String {
    listener::DEFAULT_LISTEN_ADDR.to_string()
}

/// Default sink name
#[inline]
pub fn sink_name() -> String {
    sink::DEFAULT_NAME.to_string()
}

/// Default sink channel capacity
#[inline]
pub fn sink_capacity() -> usize {
    sink::DEFAULT_CAPACITY
}
