//! Shared formatting helpers.
//!
//! All pure formatting functions used by the report renderers live here.

/// Binary units used by [`format_bytes`], smallest first.
const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format byte count as `"<value> <unit>"` with two decimals.
///
/// Scales down by 1024 while the value is at least 1024 and a larger unit
/// exists, so the result never goes beyond TB.
///
/// `0` → `"0.00 B"`, `1024` → `"1.00 KB"`, `1536` → `"1.50 KB"`
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, BYTE_UNITS[unit])
}

/// Format a cache size using whole units: `"8 MB"`, `"32 KB"`, `"512 bytes"`.
pub fn format_cache_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Percentage of `part` in `total`; `0.0` when `total` is zero.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Format a frequency in MHz, or `"-"` when it was not measured.
pub fn format_frequency(mhz: Option<f64>) -> String {
    match mhz {
        Some(v) if v >= 1000.0 => format!("{:.2} GHz", v / 1000.0),
        Some(v) => format!("{:.0} MHz", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_small_values() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1), "1.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
    }

    #[test]
    fn test_format_bytes_unit_steps() {
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
        assert_eq!(format_bytes(1024_u64.pow(4)), "1.00 TB");
    }

    #[test]
    fn test_format_bytes_never_beyond_tb() {
        assert_eq!(format_bytes(1024_u64.pow(5)), "1024.00 TB");
        assert!(format_bytes(u64::MAX).ends_with(" TB"));
    }

    #[test]
    fn test_format_cache_size() {
        assert_eq!(format_cache_size(8 * 1024 * 1024), "8 MB");
        assert_eq!(format_cache_size(32 * 1024), "32 KB");
        assert_eq!(format_cache_size(512), "512 bytes");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(50, 200), 25.0);
    }

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(None), "-");
        assert_eq!(format_frequency(Some(800.0)), "800 MHz");
        assert_eq!(format_frequency(Some(3400.0)), "3.40 GHz");
    }
}
