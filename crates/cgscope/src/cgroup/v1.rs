//! Metric collection on cgroup v1 (per-controller hierarchies).

use std::path::{Path, PathBuf};

use cgscope_common::ProbeResult;

use super::paths::ControllerPaths;
use super::sampler::{self, CounterUnit};
use super::{join_cgroup_path, v1_controller_dir};
use crate::config::ProbeConfig;
use crate::fs;
use crate::report::{CpuLimit, CpuUsage, MemoryLimit, Metric, V1Cpu, V1Memory, V1Report};

/// Kernel sentinel for "no memory limit": i64::MAX rounded down to a page
/// boundary. Any value at or above it is treated as unbounded rather than a
/// real byte limit.
const MEMORY_UNLIMITED_SENTINEL: u64 = 9_223_372_036_854_771_712;

/// Collect the v1 report. The sampler inside blocks for the configured
/// interval.
#[must_use]
pub fn collect(config: &ProbeConfig, paths: &ControllerPaths) -> V1Report {
    V1Report {
        cpu: collect_cpu(config, paths),
        memory: collect_memory(config, paths),
    }
}

fn collect_cpu(config: &ProbeConfig, paths: &ControllerPaths) -> Metric<V1Cpu> {
    let Some(relative) = paths.cpu() else {
        return Metric::Error("cpu cgroup path not found in /proc/self/cgroup".to_string());
    };
    let dir = join_cgroup_path(&v1_controller_dir(&config.cgroup_root, "cpu"), relative);

    // Quota and period are the primary metrics; their failure fails the group.
    let limit = match read_limit(&dir) {
        Ok(limit) => limit,
        Err(err) => return Metric::Error(err.to_string()),
    };

    let usage = sample_usage(config, &dir, &limit);

    Metric::Value(V1Cpu {
        limit,
        shares: fs::parse_trimmed(&dir.join("cpu.shares")).into(),
        stat: fs::read_trimmed(&dir.join("cpu.stat")).into(),
        usage,
    })
}

/// Read cpu.cfs_quota_us and cpu.cfs_period_us. A negative quota is the
/// kernel's "no quota" sentinel; the period is not read in that case.
fn read_limit(dir: &Path) -> ProbeResult<CpuLimit> {
    let quota: i64 = fs::parse_trimmed(&dir.join("cpu.cfs_quota_us"))?;
    if quota < 0 {
        return Ok(CpuLimit::Unlimited);
    }
    let period: u64 = fs::parse_trimmed(&dir.join("cpu.cfs_period_us"))?;
    Ok(CpuLimit::Limited {
        quota_us: quota as u64,
        period_us: period,
    })
}

/// Sample cpuacct.usage (cumulative nanoseconds) twice.
fn sample_usage(config: &ProbeConfig, dir: &Path, limit: &CpuLimit) -> Metric<CpuUsage> {
    let counter = dir.join("cpuacct.usage");
    sampler::sample(
        || fs::parse_trimmed::<u64>(&counter),
        config.sample_interval,
        CounterUnit::Nanoseconds,
    )
    .map(|cores| CpuUsage {
        cores,
        of_limit_percent: sampler::percent_of_limit(cores, limit.cores()),
    })
    .into()
}

fn collect_memory(config: &ProbeConfig, paths: &ControllerPaths) -> Metric<V1Memory> {
    let Some(relative) = paths.memory() else {
        return Metric::Error("memory cgroup path not found in /proc/self/cgroup".to_string());
    };
    let dir = memory_dir(config, relative);

    let limit = match fs::parse_trimmed::<u64>(&dir.join("memory.limit_in_bytes")) {
        Ok(raw) if raw >= MEMORY_UNLIMITED_SENTINEL => MemoryLimit::Unlimited,
        Ok(raw) => MemoryLimit::Bytes(raw),
        Err(err) => return Metric::Error(err.to_string()),
    };

    Metric::Value(V1Memory {
        limit,
        usage: fs::parse_trimmed(&dir.join("memory.usage_in_bytes")).into(),
        stat: fs::read_trimmed(&dir.join("memory.stat")).into(),
    })
}

fn memory_dir(config: &ProbeConfig, relative: &str) -> PathBuf {
    join_cgroup_path(&v1_controller_dir(&config.cgroup_root, "memory"), relative)
}
