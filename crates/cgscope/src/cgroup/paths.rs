//! Controller path resolution from the process's cgroup membership file.
//!
//! Each line of /proc/self/cgroup has the form `hierarchy-id:controllers:path`.
//! On v1 every controller hierarchy has its own line; on v2 there is a single
//! unified line (`0::/path`).

use std::collections::HashMap;

use super::CgroupVersion;

/// Map key for the v1 cpu controller path.
pub const CPU: &str = "cpu";
/// Map key for the v1 memory controller path.
pub const MEMORY: &str = "memory";
/// Map key for the v2 unified path.
pub const UNIFIED: &str = "unified";

/// Controller-name to cgroup-relative-path map, built fresh per report.
#[derive(Debug, Clone, Default)]
pub struct ControllerPaths {
    map: HashMap<&'static str, String>,
}

impl ControllerPaths {
    /// Parse the membership file content for the given version.
    ///
    /// Malformed lines (fewer than three colon-separated fields) are skipped
    /// silently. For v1 the last line naming a controller wins; for v2 the
    /// first non-root path is authoritative and later lines are ignored.
    #[must_use]
    pub fn parse(content: &str, version: CgroupVersion) -> Self {
        let mut paths = Self::default();
        for line in content.lines() {
            let Some((controllers, path)) = split_line(line) else {
                tracing::debug!(line, "skipping malformed cgroup line");
                continue;
            };
            match version {
                CgroupVersion::V1 => {
                    if names_controller(controllers, CPU) {
                        paths.map.insert(CPU, path.to_string());
                    }
                    if names_controller(controllers, MEMORY) {
                        paths.map.insert(MEMORY, path.to_string());
                    }
                }
                CgroupVersion::V2 => {
                    if path != "/" && !paths.map.contains_key(UNIFIED) {
                        paths.map.insert(UNIFIED, path.to_string());
                    }
                }
                CgroupVersion::Unknown => {}
            }
        }
        paths
    }

    /// Path for the v1 cpu controller.
    #[must_use]
    pub fn cpu(&self) -> Option<&str> {
        self.map.get(CPU).map(String::as_str)
    }

    /// Path for the v1 memory controller.
    #[must_use]
    pub fn memory(&self) -> Option<&str> {
        self.map.get(MEMORY).map(String::as_str)
    }

    /// The single v2 unified path.
    #[must_use]
    pub fn unified(&self) -> Option<&str> {
        self.map.get(UNIFIED).map(String::as_str)
    }
}

/// Split a membership line into its controller list and path.
///
/// Splits on the first two colons only; v2 paths may themselves contain
/// colons.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.splitn(3, ':');
    let _hierarchy_id = fields.next()?;
    let controllers = fields.next()?;
    let path = fields.next()?;
    Some((controllers, path))
}

/// Whether a comma-separated controller list names the given controller.
///
/// Exact matching per entry, so "cpuset" does not count as "cpu" and the
/// combined "cpu,cpuacct" list still matches.
fn names_controller(controllers: &str, name: &str) -> bool {
    controllers.split(',').any(|entry| entry == name)
}
