//! Probe orchestration: detection, path resolution, collection.

use cgscope_common::{ProbeError, ProbeResult};

use crate::cgroup::paths::ControllerPaths;
use crate::cgroup::{CgroupVersion, v1, v2};
use crate::config::ProbeConfig;
use crate::report::CgroupReport;

/// Run a full probe and build the report.
///
/// Blocks the calling thread for the configured sampling interval. Every
/// failure except an unreadable membership file is captured inside the
/// report; [`ProbeError::ProcCgroup`] is the only hard error.
pub fn run(config: &ProbeConfig) -> ProbeResult<CgroupReport> {
    let version = CgroupVersion::detect(config);
    tracing::debug!(%version, root = %config.cgroup_root.display(), "detected cgroup version");

    match version {
        CgroupVersion::Unknown => Ok(CgroupReport::Unknown {
            reason: format!(
                "neither a cgroup v2 marker (cgroup.controllers) nor a v1 cpu controller \
                 found under {}",
                config.cgroup_root.display()
            ),
        }),
        CgroupVersion::V1 => {
            let paths = resolve_paths(config, version)?;
            Ok(CgroupReport::V1(v1::collect(config, &paths)))
        }
        CgroupVersion::V2 => {
            let paths = resolve_paths(config, version)?;
            Ok(CgroupReport::V2(v2::collect(config, &paths)))
        }
    }
}

fn resolve_paths(config: &ProbeConfig, version: CgroupVersion) -> ProbeResult<ControllerPaths> {
    let content =
        std::fs::read_to_string(&config.proc_cgroup).map_err(|source| ProbeError::ProcCgroup {
            path: config.proc_cgroup.clone(),
            source,
        })?;
    Ok(ControllerPaths::parse(&content, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn unknown_version_short_circuits_without_membership_file() {
        let root = tempdir().unwrap();
        // No markers and no proc.cgroup file: still a clean Unknown report.
        let config = ProbeConfig::with_root(root.path());
        let report = run(&config).unwrap();
        assert!(matches!(report, CgroupReport::Unknown { .. }));
    }

    #[test]
    fn unreadable_membership_file_is_the_only_hard_error() {
        let root = tempdir().unwrap();
        std::fs::write(root.path().join("cgroup.controllers"), "cpu memory\n").unwrap();
        let config = ProbeConfig::with_root(root.path());
        let err = run(&config).unwrap_err();
        assert!(matches!(err, ProbeError::ProcCgroup { .. }));
    }
}
