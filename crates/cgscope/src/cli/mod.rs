//! CLI definition and handler.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;

use crate::config::ProbeConfig;
use crate::probe;

/// cgscope - container cgroup limit and usage inspector
#[derive(Parser, Debug)]
#[command(name = "cgscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root of the cgroup filesystem
    #[arg(long, default_value = "/sys/fs/cgroup")]
    pub cgroup_root: PathBuf,

    /// Seconds to wait between the two CPU usage samples
    #[arg(long, default_value_t = 2.0)]
    pub interval: f64,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Run the probe once and print the report to stdout.
    ///
    /// Blocks for the sampling interval. Fails (non-zero exit) only when the
    /// cgroup membership file cannot be read at all.
    pub fn execute(self) -> Result<()> {
        let config = ProbeConfig {
            cgroup_root: self.cgroup_root,
            sample_interval: Duration::from_secs_f64(self.interval),
            ..ProbeConfig::default()
        };

        tracing::info!(
            interval_secs = self.interval,
            "sampling CPU usage, this blocks for the interval"
        );
        let report = probe::run(&config)?;

        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&report)?),
            _ => print!("{report}"),
        }
        Ok(())
    }
}
