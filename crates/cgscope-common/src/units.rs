//! Byte-unit conversion helpers.

/// Bytes per mebibyte.
pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Convert a byte count to mebibytes.
#[must_use]
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}

/// Render a byte count with its MiB equivalent, e.g. `"1048576 bytes (1.00 MiB)"`.
#[must_use]
pub fn display_bytes(bytes: u64) -> String {
    format!("{bytes} bytes ({:.2} MiB)", bytes_to_mib(bytes))
}
