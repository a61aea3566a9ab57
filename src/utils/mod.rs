//! Common utilities and helpers

use std::time::Duration;

pub mod path;
pub mod time;

const SIZE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Utility functions for Shortsplit
pub struct Utils;

impl Utils {
    /// Elapsed batch time for logs: `1.250s`, `1m01.250s` or `1h02m03.000s`
    pub fn format_duration(elapsed: Duration) -> String {
        let millis = elapsed.as_millis();
        let (hours, rest) = (millis / 3_600_000, millis % 3_600_000);
        let (minutes, rest) = (rest / 60_000, rest % 60_000);
        let (seconds, millis) = (rest / 1000, rest % 1000);

        match (hours, minutes) {
            (0, 0) => format!("{seconds}.{millis:03}s"),
            (0, _) => format!("{minutes}m{seconds:02}.{millis:03}s"),
            _ => format!("{hours}h{minutes:02}m{seconds:02}.{millis:03}s"),
        }
    }

    /// Upload size in binary units, e.g. `2.0 GiB`
    pub fn format_file_size(bytes: u64) -> String {
        let exponent = SIZE_UNITS
            .iter()
            .enumerate()
            .rev()
            .find(|(i, _)| bytes >= 1u64 << (10 * *i as u32))
            .map(|(i, _)| i)
            .unwrap_or(0);

        if exponent == 0 {
            format!("{bytes} B")
        } else {
            let scaled = bytes as f64 / (1u64 << (10 * exponent as u32)) as f64;
            format!("{scaled:.1} {}", SIZE_UNITS[exponent])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(Utils::format_duration(Duration::from_millis(1_250)), "1.250s");
        assert_eq!(Utils::format_duration(Duration::from_millis(61_250)), "1m01.250s");
        assert_eq!(Utils::format_duration(Duration::from_secs(3723)), "1h02m03.000s");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(Utils::format_file_size(0), "0 B");
        assert_eq!(Utils::format_file_size(512), "512 B");
        assert_eq!(Utils::format_file_size(1536), "1.5 KiB");
        assert_eq!(Utils::format_file_size(2 * 1024 * 1024 * 1024), "2.0 GiB");
    }
}
