//! Cgroup pseudo-file access.
//!
//! Pseudo-files are either present and instantaneously readable or
//! structurally absent (wrong cgroup version, controller not mounted), so
//! nothing here retries.

use std::path::Path;
use std::str::FromStr;

use cgscope_common::{ProbeError, ProbeResult};

/// Read a pseudo-file and return its whitespace-trimmed content.
pub fn read_trimmed(path: &Path) -> ProbeResult<String> {
    let content = std::fs::read_to_string(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.trim().to_string())
}

/// Read a pseudo-file holding a single value and parse it.
pub fn parse_trimmed<T: FromStr>(path: &Path) -> ProbeResult<T> {
    let content = read_trimmed(path)?;
    content.parse().map_err(|_| ProbeError::Parse {
        path: path.to_path_buf(),
        message: format!("expected a number, got {content:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn read_trims_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu.weight");
        std::fs::write(&path, "100\n").unwrap();
        assert_eq!(read_trimmed(&path).unwrap(), "100");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu.weight");
        let err = read_trimmed(&path).unwrap_err();
        assert!(matches!(err, ProbeError::Io { .. }));
        assert!(err.to_string().contains("cpu.weight"));
    }

    #[test]
    fn parse_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.current");
        std::fs::write(&path, "4194304\n").unwrap();
        assert_eq!(parse_trimmed::<u64>(&path).unwrap(), 4_194_304);
    }

    #[test]
    fn parse_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.current");
        std::fs::write(&path, "not-a-number\n").unwrap();
        let err = parse_trimmed::<u64>(&path).unwrap_err();
        assert!(matches!(err, ProbeError::Parse { .. }));
    }
}
