//! Common error types for the cgscope crates.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`ProbeError`].
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors raised while probing cgroup state.
///
/// Cgroup pseudo-files are synchronous kernel-exposed state, so no error here
/// is retried. Most errors end up captured inside the report rather than
/// propagated; the exception is [`ProbeError::ProcCgroup`], which aborts the
/// whole report because no controller paths can be resolved without it.
#[derive(Error, Diagnostic, Debug)]
pub enum ProbeError {
    /// A cgroup pseudo-file could not be read.
    #[error("failed to read cgroup file {}: {source}", path.display())]
    #[diagnostic(code(cgscope::io))]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A readable file held content in an unexpected format.
    #[error("unexpected content in {}: {message}", path.display())]
    #[diagnostic(code(cgscope::parse))]
    Parse {
        /// The file with the malformed content.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The process's cgroup membership file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    #[diagnostic(
        code(cgscope::proc_cgroup),
        help("cgscope needs a Linux environment with cgroups enabled")
    )]
    ProcCgroup {
        /// The membership file, normally /proc/self/cgroup.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configured sampling interval cannot be used.
    #[error("invalid sampling interval: {message}")]
    #[diagnostic(code(cgscope::interval))]
    InvalidInterval {
        /// Why the interval was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_path() {
        let err = ProbeError::Io {
            path: PathBuf::from("/sys/fs/cgroup/cpu.max"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.contains("/sys/fs/cgroup/cpu.max"));
        assert!(text.contains("no such file"));
    }

    #[test]
    fn parse_error_display() {
        let err = ProbeError::Parse {
            path: PathBuf::from("/sys/fs/cgroup/cpu.max"),
            message: "expected \"<quota> <period>\"".to_string(),
        };
        assert!(err.to_string().starts_with("unexpected content in"));
    }
}
