//! # cgscope-common
//!
//! Shared types for the cgscope crates:
//! - Common error type for probing cgroup pseudo-files
//! - Byte-unit conversion helpers

#![warn(missing_docs)]

pub mod error;
pub mod units;

pub use error::{ProbeError, ProbeResult};
