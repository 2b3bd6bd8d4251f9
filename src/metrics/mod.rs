//! Prometheus metrics for the Guestbook Operator
//!
//! This module exposes metrics for monitoring operator health and performance.

pub mod prometheus;

pub use self::prometheus::*;
