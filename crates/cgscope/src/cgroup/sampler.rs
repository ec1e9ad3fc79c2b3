//! Instantaneous CPU utilization from two cumulative counter readings.
//!
//! Cgroups expose only cumulative CPU time, so an instantaneous figure needs
//! two readings separated by a wait. The wait blocks the calling thread for
//! the configured interval; that is a deliberate, bounded synchronous delay.

use std::time::Duration;

use cgscope_common::{ProbeError, ProbeResult};

/// Time unit of a cumulative CPU usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUnit {
    /// v1 cpuacct.usage counts nanoseconds.
    Nanoseconds,
    /// v2 cpu.stat usage_usec counts microseconds.
    Microseconds,
}

impl CounterUnit {
    /// The sampling interval expressed in this counter's unit.
    ///
    /// The nominal interval is trusted to equal the actual wait; no
    /// wall-clock delta is measured.
    #[must_use]
    pub fn interval_units(self, interval: Duration) -> u64 {
        match self {
            Self::Nanoseconds => u64::try_from(interval.as_nanos()).unwrap_or(u64::MAX),
            Self::Microseconds => u64::try_from(interval.as_micros()).unwrap_or(u64::MAX),
        }
    }
}

/// Derive CPU usage in cores from two counter readings.
///
/// Both readings and the elapsed time must be in the same unit.
#[must_use]
pub fn cores_from_delta(first: u64, second: u64, elapsed_units: u64) -> f64 {
    second.saturating_sub(first) as f64 / elapsed_units as f64
}

/// Usage as a percentage of the core limit; `None` without a finite limit.
#[must_use]
pub fn percent_of_limit(cores: f64, limit_cores: Option<f64>) -> Option<f64> {
    limit_cores
        .filter(|limit| *limit > 0.0)
        .map(|limit| cores / limit * 100.0)
}

/// Sample the counter twice, `interval` apart, and return usage in cores.
///
/// Blocks the calling thread for the full interval. A zero interval (or one
/// that rounds to zero counter units) is rejected to guard the division.
pub fn sample<F>(mut read_counter: F, interval: Duration, unit: CounterUnit) -> ProbeResult<f64>
where
    F: FnMut() -> ProbeResult<u64>,
{
    let elapsed_units = unit.interval_units(interval);
    if elapsed_units == 0 {
        return Err(ProbeError::InvalidInterval {
            message: format!("{interval:?} rounds to zero counter units"),
        });
    }

    let first = read_counter()?;
    tracing::debug!(?interval, first, "sampling CPU usage");
    std::thread::sleep(interval);
    let second = read_counter()?;

    Ok(cores_from_delta(first, second, elapsed_units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_readings_yield_zero_cores() {
        assert_eq!(cores_from_delta(1_000_000, 1_000_000, 2_000_000_000), 0.0);
    }

    #[test]
    fn half_core_over_two_seconds() {
        // 1e9 ns of CPU time over a 2e9 ns interval is half a core.
        assert_eq!(cores_from_delta(0, 1_000_000_000, 2_000_000_000), 0.5);
    }

    #[test]
    fn counter_regression_clamps_to_zero() {
        assert_eq!(cores_from_delta(500, 400, 1_000_000), 0.0);
    }

    #[test]
    fn percent_of_limit_half_core_of_one() {
        let percent = percent_of_limit(0.5, Some(1.0)).unwrap();
        assert!((percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_of_limit_without_limit() {
        assert_eq!(percent_of_limit(0.5, None), None);
        assert_eq!(percent_of_limit(0.5, Some(0.0)), None);
    }

    #[test]
    fn interval_unit_conversion() {
        let two_secs = Duration::from_secs(2);
        assert_eq!(
            CounterUnit::Nanoseconds.interval_units(two_secs),
            2_000_000_000
        );
        assert_eq!(CounterUnit::Microseconds.interval_units(two_secs), 2_000_000);
    }

    #[test]
    fn sample_reads_twice() {
        let mut readings = [100_u64, 1_100].into_iter();
        let cores = sample(
            || Ok(readings.next().unwrap()),
            Duration::from_micros(1_000),
            CounterUnit::Microseconds,
        )
        .unwrap();
        assert_eq!(cores, 1.0);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = sample(|| Ok(0), Duration::ZERO, CounterUnit::Microseconds).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidInterval { .. }));
    }

    #[test]
    fn failed_read_propagates() {
        let err = sample(
            || {
                Err(ProbeError::Io {
                    path: "/sys/fs/cgroup/cpuacct.usage".into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                })
            },
            Duration::from_micros(10),
            CounterUnit::Microseconds,
        )
        .unwrap_err();
        assert!(matches!(err, ProbeError::Io { .. }));
    }
}
