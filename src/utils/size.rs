//! Human-readable byte size formatting.

/// Format a byte count as `1.5KB`, `3.2MB`, ...
///
/// One decimal place, powers of 1024.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}
