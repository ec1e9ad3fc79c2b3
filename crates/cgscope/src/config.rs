//! Probe configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cgroup mount root.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Default cgroup membership file for the current process.
pub const DEFAULT_PROC_CGROUP: &str = "/proc/self/cgroup";

/// Default wait between the two cumulative CPU usage readings.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration passed explicitly into every probe component.
///
/// There is no global or environment-driven state in the core logic; tests
/// substitute `cgroup_root` and `proc_cgroup` with a synthetic tree.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Root of the cgroup filesystem (default: /sys/fs/cgroup).
    pub cgroup_root: PathBuf,
    /// Cgroup membership file for the process (default: /proc/self/cgroup).
    pub proc_cgroup: PathBuf,
    /// Wait between the two CPU usage samples (default: 2 s).
    pub sample_interval: Duration,
}

impl ProbeConfig {
    /// Create a configuration with default locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration rooted at a custom directory.
    ///
    /// The membership file is expected at `<root>/proc.cgroup`, which is
    /// where test fixtures place it.
    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            cgroup_root: root.to_path_buf(),
            proc_cgroup: root.join("proc.cgroup"),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            proc_cgroup: PathBuf::from(DEFAULT_PROC_CGROUP),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}
