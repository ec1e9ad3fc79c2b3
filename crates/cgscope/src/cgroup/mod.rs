//! Cgroup detection and metric collection.
//!
//! The version detector probes marker files under the cgroup root, the path
//! resolver maps controllers to the process's cgroup paths, and the v1/v2
//! collectors turn the control files into a report.

pub mod paths;
pub mod sampler;
pub mod v1;
pub mod v2;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ProbeConfig;

/// Marker file for the cgroup v2 unified hierarchy.
const V2_MARKER: &str = "cgroup.controllers";

/// Candidate mount directories for the v1 cpu controller. Some distributions
/// mount cpu and cpuacct combined.
const V1_CPU_DIRS: [&str; 2] = ["cpu", "cpu,cpuacct"];

/// Detected cgroup version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CgroupVersion {
    /// Neither v1 nor v2 markers were found.
    Unknown,
    /// Cgroups v1 (per-controller hierarchies).
    V1,
    /// Cgroups v2 (unified hierarchy).
    V2,
}

impl CgroupVersion {
    /// Detect the cgroup version governing this system.
    ///
    /// The v2 marker is checked first: a v2-only system has no v1 markers,
    /// and hybrid systems should be read through the unified hierarchy. A
    /// failed stat means "marker absent", never an error.
    #[must_use]
    pub fn detect(config: &ProbeConfig) -> Self {
        if config.cgroup_root.join(V2_MARKER).exists() {
            return Self::V2;
        }
        if V1_CPU_DIRS
            .iter()
            .any(|dir| config.cgroup_root.join(dir).exists())
        {
            return Self::V1;
        }
        Self::Unknown
    }
}

impl fmt::Display for CgroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "cgroup v1"),
            Self::V2 => write!(f, "cgroup v2"),
            Self::Unknown => write!(f, "unknown cgroup version"),
        }
    }
}

/// Resolve the mount directory for a v1 controller under the cgroup root.
///
/// Prefers the plain controller directory, falling back to the combined
/// `cpu,cpuacct` mount for the cpu controller.
fn v1_controller_dir(root: &Path, controller: &str) -> PathBuf {
    let plain = root.join(controller);
    if controller == "cpu" && !plain.exists() {
        let combined = root.join("cpu,cpuacct");
        if combined.exists() {
            return combined;
        }
    }
    plain
}

/// Join a path from /proc/self/cgroup onto a controller mount directory.
///
/// The membership paths are absolute within the hierarchy ("/docker/abc"),
/// so the leading slash must be stripped before joining.
fn join_cgroup_path(dir: &Path, relative: &str) -> PathBuf {
    dir.join(relative.trim_start_matches('/'))
}
