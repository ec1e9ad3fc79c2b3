//! Metric collection on cgroup v2 (unified hierarchy).

use std::path::Path;

use cgscope_common::{ProbeError, ProbeResult};

use super::join_cgroup_path;
use super::paths::ControllerPaths;
use super::sampler::{self, CounterUnit};
use crate::config::ProbeConfig;
use crate::fs;
use crate::report::{CpuLimit, CpuUsage, MemoryLimit, Metric, V2Cpu, V2Memory, V2Report};

/// Quota token meaning "no limit" in cpu.max and memory.max.
const MAX_TOKEN: &str = "max";

/// Collect the v2 report. The sampler inside blocks for the configured
/// interval.
#[must_use]
pub fn collect(config: &ProbeConfig, paths: &ControllerPaths) -> V2Report {
    let Some(relative) = paths.unified() else {
        let message = "unified cgroup path not found in /proc/self/cgroup".to_string();
        return V2Report {
            cpu: Metric::Error(message.clone()),
            memory: Metric::Error(message),
        };
    };
    let dir = join_cgroup_path(&config.cgroup_root, relative);

    V2Report {
        cpu: collect_cpu(config, &dir),
        memory: collect_memory(&dir),
    }
}

fn collect_cpu(config: &ProbeConfig, dir: &Path) -> Metric<V2Cpu> {
    let limit = match read_limit(dir) {
        Ok(limit) => limit,
        Err(err) => return Metric::Error(err.to_string()),
    };

    let usage = sample_usage(config, dir, &limit);

    Metric::Value(V2Cpu {
        limit,
        weight: fs::parse_trimmed(&dir.join("cpu.weight")).into(),
        stat: fs::read_trimmed(&dir.join("cpu.stat")).into(),
        usage,
    })
}

fn read_limit(dir: &Path) -> ProbeResult<CpuLimit> {
    let path = dir.join("cpu.max");
    let content = fs::read_trimmed(&path)?;
    parse_cpu_max(&content, &path)
}

/// Parse a cpu.max line of the form `"<quota> <period>"`.
///
/// The quota may be the literal token "max" (unlimited). Fewer than two
/// tokens is a format error.
fn parse_cpu_max(content: &str, path: &Path) -> ProbeResult<CpuLimit> {
    let mut tokens = content.split_whitespace();
    let (Some(quota), Some(period)) = (tokens.next(), tokens.next()) else {
        return Err(ProbeError::Parse {
            path: path.to_path_buf(),
            message: format!("expected \"<quota> <period>\", got {content:?}"),
        });
    };

    if quota == MAX_TOKEN {
        return Ok(CpuLimit::Unlimited);
    }

    let quota_us: u64 = quota.parse().map_err(|_| ProbeError::Parse {
        path: path.to_path_buf(),
        message: format!("quota is neither \"max\" nor a number: {quota:?}"),
    })?;
    let period_us: u64 = period.parse().map_err(|_| ProbeError::Parse {
        path: path.to_path_buf(),
        message: format!("period is not a number: {period:?}"),
    })?;

    Ok(CpuLimit::Limited { quota_us, period_us })
}

/// Sample the usage_usec field of cpu.stat (cumulative microseconds) twice.
fn sample_usage(config: &ProbeConfig, dir: &Path, limit: &CpuLimit) -> Metric<CpuUsage> {
    let stat = dir.join("cpu.stat");
    sampler::sample(
        || read_usage_usec(&stat),
        config.sample_interval,
        CounterUnit::Microseconds,
    )
    .map(|cores| CpuUsage {
        cores,
        of_limit_percent: sampler::percent_of_limit(cores, limit.cores()),
    })
    .into()
}

fn read_usage_usec(path: &Path) -> ProbeResult<u64> {
    let content = fs::read_trimmed(path)?;
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        if fields.next() == Some("usage_usec") {
            let value = fields.next().ok_or_else(|| ProbeError::Parse {
                path: path.to_path_buf(),
                message: "usage_usec line has no value".to_string(),
            })?;
            return value.parse().map_err(|_| ProbeError::Parse {
                path: path.to_path_buf(),
                message: format!("usage_usec is not a number: {value:?}"),
            });
        }
    }
    Err(ProbeError::Parse {
        path: path.to_path_buf(),
        message: "usage_usec not found in cpu.stat".to_string(),
    })
}

fn collect_memory(dir: &Path) -> Metric<V2Memory> {
    let limit = match fs::read_trimmed(&dir.join("memory.max")) {
        Ok(content) if content == MAX_TOKEN => MemoryLimit::Unlimited,
        Ok(content) => match content.parse::<u64>() {
            Ok(bytes) => MemoryLimit::Bytes(bytes),
            Err(_) => {
                return Metric::Error(format!(
                    "unexpected content in {}: expected \"max\" or a byte count, got {content:?}",
                    dir.join("memory.max").display()
                ));
            }
        },
        Err(err) => return Metric::Error(err.to_string()),
    };

    Metric::Value(V2Memory {
        limit,
        current: fs::parse_trimmed(&dir.join("memory.current")).into(),
        stat: fs::read_trimmed(&dir.join("memory.stat")).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use proptest::prelude::*;
    use tempfile::{TempDir, tempdir};

    use crate::cgroup::CgroupVersion;

    fn fixture(cpu_max: &str) -> (TempDir, ProbeConfig, ControllerPaths) {
        let root = tempdir().unwrap();
        let unified = root.path().join("kubepods/pod1");
        std::fs::create_dir_all(&unified).unwrap();

        std::fs::write(unified.join("cpu.max"), format!("{cpu_max}\n")).unwrap();
        std::fs::write(unified.join("cpu.weight"), "100\n").unwrap();
        std::fs::write(
            unified.join("cpu.stat"),
            "usage_usec 250000\nuser_usec 200000\nsystem_usec 50000\n",
        )
        .unwrap();
        std::fs::write(unified.join("memory.max"), "536870912\n").unwrap();
        std::fs::write(unified.join("memory.current"), "4194304\n").unwrap();
        std::fs::write(unified.join("memory.stat"), "anon 4194304\nfile 0\n").unwrap();

        let mut config = ProbeConfig::with_root(root.path());
        config.sample_interval = Duration::from_millis(5);

        let paths = ControllerPaths::parse("0::/kubepods/pod1\n", CgroupVersion::V2);
        (root, config, paths)
    }

    #[test]
    fn parse_limited_cpu_max() {
        let path = Path::new("cpu.max");
        assert_eq!(
            parse_cpu_max("50000 100000", path).unwrap(),
            CpuLimit::Limited {
                quota_us: 50_000,
                period_us: 100_000
            }
        );
    }

    #[test]
    fn parse_max_token_ignores_period() {
        let path = Path::new("cpu.max");
        assert_eq!(parse_cpu_max("max 100000", path).unwrap(), CpuLimit::Unlimited);
    }

    #[test]
    fn single_token_is_a_format_error() {
        let path = Path::new("cpu.max");
        let err = parse_cpu_max("50000", path).unwrap_err();
        assert!(matches!(err, ProbeError::Parse { .. }));
    }

    #[test]
    fn non_numeric_quota_is_a_format_error() {
        let path = Path::new("cpu.max");
        assert!(parse_cpu_max("lots 100000", path).is_err());
    }

    proptest! {
        #[test]
        fn quota_period_arithmetic(quota in 1u64..10_000_000, period in 1u64..10_000_000) {
            let path = Path::new("cpu.max");
            let limit = parse_cpu_max(&format!("{quota} {period}"), path).unwrap();
            let cores = limit.cores().unwrap();
            let expected = quota as f64 / period as f64;
            prop_assert!((cores - expected).abs() < 1e-9);
            prop_assert!((limit.burstable_percent().unwrap() - expected * 100.0).abs() < 1e-7);
        }
    }

    #[test]
    fn collect_reads_all_groups() {
        let (_root, config, paths) = fixture("50000 100000");
        let report = collect(&config, &paths);

        let cpu = report.cpu.value().unwrap();
        assert_eq!(cpu.limit.cores(), Some(0.5));
        assert_eq!(cpu.weight.value(), Some(&100));
        // Static counter over the interval reads as zero cores, and the
        // utilization of a 0.5-core limit is a defined 0%.
        assert_eq!(cpu.usage.value().unwrap().cores, 0.0);
        assert_eq!(cpu.usage.value().unwrap().of_limit_percent, Some(0.0));

        let memory = report.memory.value().unwrap();
        assert_eq!(memory.limit, MemoryLimit::Bytes(536_870_912));
        assert_eq!(memory.current.value(), Some(&4_194_304));
    }

    #[test]
    fn memory_max_token_is_unlimited() {
        let (root, config, paths) = fixture("max 100000");
        std::fs::write(root.path().join("kubepods/pod1/memory.max"), "max\n").unwrap();
        let report = collect(&config, &paths);

        let cpu = report.cpu.value().unwrap();
        assert_eq!(cpu.limit, CpuLimit::Unlimited);
        assert_eq!(cpu.usage.value().unwrap().of_limit_percent, None);

        assert_eq!(
            report.memory.value().unwrap().limit,
            MemoryLimit::Unlimited
        );
    }

    #[test]
    fn missing_cpu_max_fails_only_the_cpu_group() {
        let (root, config, paths) = fixture("50000 100000");
        std::fs::remove_file(root.path().join("kubepods/pod1/cpu.max")).unwrap();
        let report = collect(&config, &paths);
        assert!(report.cpu.error().unwrap().contains("cpu.max"));
        assert!(report.memory.value().is_some());
    }

    #[test]
    fn stat_without_usage_usec_errors_the_sampler() {
        let (root, config, paths) = fixture("50000 100000");
        std::fs::write(
            root.path().join("kubepods/pod1/cpu.stat"),
            "user_usec 200000\n",
        )
        .unwrap();
        let report = collect(&config, &paths);
        let cpu = report.cpu.value().unwrap();
        assert!(cpu.usage.error().unwrap().contains("usage_usec"));
        // The limit survives the sampler failure.
        assert_eq!(cpu.limit.cores(), Some(0.5));
    }

    #[test]
    fn missing_unified_path_errors_both_groups() {
        let (_root, config, _) = fixture("50000 100000");
        let empty = ControllerPaths::parse("0::/\n", CgroupVersion::V2);
        let report = collect(&config, &empty);
        assert!(report.cpu.error().unwrap().contains("unified"));
        assert!(report.memory.error().unwrap().contains("unified"));
    }
}
