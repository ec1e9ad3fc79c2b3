//! Report model and text presenter.
//!
//! The report is a tagged variant per detected cgroup version so presenters
//! can match exhaustively instead of checking optional-field presence. A
//! report is built fresh per probe, never mutated afterwards, and discarded
//! after rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use cgscope_common::{ProbeResult, units};

use crate::cgroup::CgroupVersion;

/// A best-effort metric: either the value or the read error shown inline.
///
/// Auxiliary metrics (shares, weight, stat blocks) degrade to their error
/// text instead of failing the whole report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Metric<T> {
    /// The metric was read successfully.
    Value(T),
    /// Reading the metric failed; the message is rendered in its place.
    Error(String),
}

impl<T> Metric<T> {
    /// The value, if the metric was read successfully.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Error(_) => None,
        }
    }

    /// The error text, if the read failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Error(e) => Some(e),
        }
    }
}

impl<T> From<ProbeResult<T>> for Metric<T> {
    fn from(result: ProbeResult<T>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(err) => Self::Error(err.to_string()),
        }
    }
}

/// CPU bandwidth limit from quota/period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuLimit {
    /// No quota set (v1 quota of -1, v2 quota token "max").
    Unlimited,
    /// Up to `quota_us` microseconds of CPU time per `period_us` microseconds.
    Limited {
        /// CPU quota in microseconds.
        quota_us: u64,
        /// CPU period in microseconds.
        period_us: u64,
    },
}

impl CpuLimit {
    /// Equivalent CPU core limit, `quota / period`.
    ///
    /// `None` when unlimited or when the period is zero (malformed file).
    #[must_use]
    pub fn cores(&self) -> Option<f64> {
        match *self {
            Self::Unlimited => None,
            Self::Limited { quota_us, period_us } => {
                (period_us > 0).then(|| quota_us as f64 / period_us as f64)
            }
        }
    }

    /// Burstable CPU percentage, `quota / period * 100`.
    #[must_use]
    pub fn burstable_percent(&self) -> Option<f64> {
        self.cores().map(|cores| cores * 100.0)
    }

    /// Quota for display, e.g. `"50000 microseconds"` or `"unlimited (no quota)"`.
    #[must_use]
    pub fn max_display(&self) -> String {
        match *self {
            Self::Unlimited => "unlimited (no quota)".to_string(),
            Self::Limited { quota_us, .. } => format!("{quota_us} microseconds"),
        }
    }

    /// Period for display; `None` when unlimited (no period was read).
    #[must_use]
    pub fn period_display(&self) -> Option<String> {
        match *self {
            Self::Unlimited => None,
            Self::Limited { period_us, .. } => Some(format!("{period_us} microseconds")),
        }
    }

    /// Burstable percentage for display, `"N/A"` when undefined.
    #[must_use]
    pub fn burstable_display(&self) -> String {
        match (self, self.burstable_percent()) {
            (Self::Unlimited, _) => "N/A (unlimited)".to_string(),
            (Self::Limited { .. }, Some(percent)) => format!("{percent:.2}%"),
            (Self::Limited { .. }, None) => "N/A".to_string(),
        }
    }
}

/// Memory limit from `memory.limit_in_bytes` (v1) or `memory.max` (v2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryLimit {
    /// No explicit limit (v2 "max" token, or the v1 unbounded sentinel).
    Unlimited,
    /// Hard limit in bytes.
    Bytes(u64),
}

impl MemoryLimit {
    /// Limit for display, with MiB equivalent for finite limits.
    #[must_use]
    pub fn display(&self) -> String {
        match *self {
            Self::Unlimited => "no explicit limit".to_string(),
            Self::Bytes(bytes) => units::display_bytes(bytes),
        }
    }
}

/// Instantaneous CPU usage derived from two time-separated samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    /// Measured usage in CPU cores.
    pub cores: f64,
    /// Usage as a percentage of the core limit; `None` without a finite limit.
    pub of_limit_percent: Option<f64>,
}

impl CpuUsage {
    /// Utilization-of-limit for display.
    #[must_use]
    pub fn of_limit_display(&self) -> String {
        match self.of_limit_percent {
            Some(percent) => format!("{percent:.2}%"),
            None => "cannot calculate (CPU limit not found or unlimited)".to_string(),
        }
    }
}

/// CPU metrics gathered from a cgroup v1 cpu controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V1Cpu {
    /// Bandwidth limit from cpu.cfs_quota_us / cpu.cfs_period_us.
    pub limit: CpuLimit,
    /// Relative scheduling priority from cpu.shares.
    pub shares: Metric<u64>,
    /// Raw cpu.stat block.
    pub stat: Metric<String>,
    /// Sampled usage from cpuacct.usage.
    pub usage: Metric<CpuUsage>,
}

/// Memory metrics gathered from a cgroup v1 memory controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V1Memory {
    /// Limit from memory.limit_in_bytes.
    pub limit: MemoryLimit,
    /// Usage from memory.usage_in_bytes.
    pub usage: Metric<u64>,
    /// Raw memory.stat block.
    pub stat: Metric<String>,
}

/// Report for a cgroup v1 system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V1Report {
    /// CPU metric group; errors when the cpu path or a primary file is missing.
    pub cpu: Metric<V1Cpu>,
    /// Memory metric group.
    pub memory: Metric<V1Memory>,
}

/// CPU metrics gathered from the cgroup v2 unified hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Cpu {
    /// Bandwidth limit from cpu.max.
    pub limit: CpuLimit,
    /// Relative scheduling priority from cpu.weight.
    pub weight: Metric<u64>,
    /// Raw cpu.stat block.
    pub stat: Metric<String>,
    /// Sampled usage from the usage_usec field of cpu.stat.
    pub usage: Metric<CpuUsage>,
}

/// Memory metrics gathered from the cgroup v2 unified hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Memory {
    /// Limit from memory.max.
    pub limit: MemoryLimit,
    /// Usage from memory.current.
    pub current: Metric<u64>,
    /// Raw memory.stat block.
    pub stat: Metric<String>,
}

/// Report for a cgroup v2 system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Report {
    /// CPU metric group; errors when the unified path or cpu.max is missing.
    pub cpu: Metric<V2Cpu>,
    /// Memory metric group.
    pub memory: Metric<V2Memory>,
}

/// A complete probe report, tagged by the detected cgroup version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CgroupReport {
    /// Neither v1 nor v2 markers were found.
    Unknown {
        /// Why detection failed.
        reason: String,
    },
    /// Metrics from a cgroup v1 system.
    V1(V1Report),
    /// Metrics from a cgroup v2 system.
    V2(V2Report),
}

impl CgroupReport {
    /// The cgroup version this report was built for.
    #[must_use]
    pub fn version(&self) -> CgroupVersion {
        match self {
            Self::Unknown { .. } => CgroupVersion::Unknown,
            Self::V1(_) => CgroupVersion::V1,
            Self::V2(_) => CgroupVersion::V2,
        }
    }

    /// Presenter-neutral sections, in render order.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        match self {
            Self::Unknown { reason } => vec![Section {
                title: "Detection".to_string(),
                body: SectionBody::Error(reason.clone()),
            }],
            Self::V1(report) => vec![
                section("CPU (cgroup v1)", &report.cpu, v1_cpu_rows),
                section("Memory (cgroup v1)", &report.memory, v1_memory_rows),
            ],
            Self::V2(report) => vec![
                section("CPU (cgroup v2)", &report.cpu, v2_cpu_rows),
                section("Memory (cgroup v2)", &report.memory, v2_memory_rows),
            ],
        }
    }
}

/// One titled block of the report.
#[derive(Debug, Clone)]
pub struct Section {
    /// Section heading, e.g. `"CPU (cgroup v2)"`.
    pub title: String,
    /// Rows, or the group error rendered exclusively.
    pub body: SectionBody,
}

/// Body of a [`Section`].
#[derive(Debug, Clone)]
pub enum SectionBody {
    /// The whole metric group failed; nothing else is rendered for it.
    Error(String),
    /// Label/value rows.
    Rows(Vec<Row>),
}

/// A single label/value row of a section.
#[derive(Debug, Clone)]
pub struct Row {
    /// Row label.
    pub label: &'static str,
    /// Rendered value.
    pub value: String,
    /// Whether the value is a multi-line block (stat files).
    pub block: bool,
}

impl Row {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            block: false,
        }
    }

    fn block(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            block: true,
        }
    }
}

fn section<T>(title: &str, group: &Metric<T>, rows: impl Fn(&T) -> Vec<Row>) -> Section {
    Section {
        title: title.to_string(),
        body: match group {
            Metric::Value(value) => SectionBody::Rows(rows(value)),
            Metric::Error(err) => SectionBody::Error(err.clone()),
        },
    }
}

fn cpu_limit_rows(rows: &mut Vec<Row>, limit: &CpuLimit, max_label: &'static str) {
    rows.push(Row::new(max_label, limit.max_display()));
    if let Some(period) = limit.period_display() {
        rows.push(Row::new("CPU Period", period));
    }
    if let Some(cores) = limit.cores() {
        rows.push(Row::new(
            "Equivalent CPU Cores Limit",
            format!("{cores:.2}"),
        ));
    }
    rows.push(Row::new("Burstable CPU", limit.burstable_display()));
}

fn cpu_usage_rows(rows: &mut Vec<Row>, usage: &Metric<CpuUsage>) {
    match usage {
        Metric::Value(usage) => {
            rows.push(Row::new(
                "Current CPU Usage (cores)",
                format!("{:.4}", usage.cores),
            ));
            rows.push(Row::new("CPU Utilization of Limit", usage.of_limit_display()));
        }
        Metric::Error(err) => rows.push(Row::new("Current CPU Usage", err.clone())),
    }
}

fn bytes_metric(metric: &Metric<u64>) -> String {
    match metric {
        Metric::Value(bytes) => units::display_bytes(*bytes),
        Metric::Error(err) => err.clone(),
    }
}

fn text_metric(metric: &Metric<String>) -> String {
    match metric {
        Metric::Value(text) => text.clone(),
        Metric::Error(err) => err.clone(),
    }
}

fn v1_cpu_rows(cpu: &V1Cpu) -> Vec<Row> {
    let mut rows = Vec::new();
    cpu_limit_rows(&mut rows, &cpu.limit, "CPU Quota");
    rows.push(Row::new(
        "CPU Shares",
        match &cpu.shares {
            Metric::Value(shares) => shares.to_string(),
            Metric::Error(err) => err.clone(),
        },
    ));
    cpu_usage_rows(&mut rows, &cpu.usage);
    rows.push(Row::block("CPU Stat", text_metric(&cpu.stat)));
    rows
}

fn v1_memory_rows(memory: &V1Memory) -> Vec<Row> {
    vec![
        Row::new("Memory Limit", memory.limit.display()),
        Row::new("Memory Usage", bytes_metric(&memory.usage)),
        Row::block("Memory Stat", text_metric(&memory.stat)),
    ]
}

fn v2_cpu_rows(cpu: &V2Cpu) -> Vec<Row> {
    let mut rows = Vec::new();
    cpu_limit_rows(&mut rows, &cpu.limit, "CPU Max");
    rows.push(Row::new(
        "CPU Weight",
        match &cpu.weight {
            Metric::Value(weight) => weight.to_string(),
            Metric::Error(err) => err.clone(),
        },
    ));
    cpu_usage_rows(&mut rows, &cpu.usage);
    rows.push(Row::block("CPU Stat", text_metric(&cpu.stat)));
    rows
}

fn v2_memory_rows(memory: &V2Memory) -> Vec<Row> {
    vec![
        Row::new("Memory Limit", memory.limit.display()),
        Row::new("Memory Usage", bytes_metric(&memory.current)),
        Row::block("Memory Stat", text_metric(&memory.stat)),
    ]
}

impl fmt::Display for CgroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Cgroup Information ---")?;
        writeln!(f, "Detected cgroup version: {}", self.version())?;
        for section in self.sections() {
            writeln!(f)?;
            writeln!(f, "{}:", section.title)?;
            match &section.body {
                SectionBody::Error(err) => writeln!(f, "  error: {err}")?,
                SectionBody::Rows(rows) => {
                    for row in rows {
                        if row.block {
                            writeln!(f, "  {}:", row.label)?;
                            for line in row.value.lines() {
                                writeln!(f, "    {line}")?;
                            }
                        } else {
                            writeln!(f, "  {}: {}", row.label, row.value)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
