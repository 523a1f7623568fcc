//! Size and ratio helpers shared by the per-file and summary reports.

use std::path::Path;

const BYTES_PER_KB: f64 = 1024.0;

/// Formats a byte count as kilobytes with one decimal, e.g. `"812.4 KB"`.
pub fn format_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / BYTES_PER_KB)
}

/// Same as [`format_kb`] for signed quantities such as space saved, which
/// goes negative when a batch grew.
pub fn format_signed_kb(bytes: i64) -> String {
    format!("{:.1} KB", bytes as f64 / BYTES_PER_KB)
}

/// Percentage reduction from `original_size` to `new_size`.
///
/// Positive means the file shrank, negative means it grew. Returns `None`
/// when there is no original size to divide by.
pub fn calculate_reduction(original_size: u64, new_size: u64) -> Option<f64> {
    if original_size == 0 {
        return None;
    }
    Some(((original_size as f64 - new_size as f64) / original_size as f64) * 100.0)
}

/// File name for report lines, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
