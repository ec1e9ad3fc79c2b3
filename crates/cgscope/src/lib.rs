//! # cgscope
//!
//! cgscope inspects the cgroup configuration and usage of the running
//! container: which cgroup version governs the process, what CPU quota,
//! period and shares/weight apply, what memory limit is set, and how close
//! current usage is to those limits.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use cgscope::ProbeConfig;
//!
//! # fn example() -> cgscope_common::ProbeResult<()> {
//! let config = ProbeConfig {
//!     sample_interval: Duration::from_secs(2),
//!     ..ProbeConfig::default()
//! };
//!
//! // Blocks for the sampling interval while measuring CPU usage.
//! let report = cgscope::probe::run(&config)?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cgroup;
pub mod cli;
pub mod config;
pub mod fs;
pub mod probe;
pub mod report;

pub use config::ProbeConfig;
pub use report::CgroupReport;
