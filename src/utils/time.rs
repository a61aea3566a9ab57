//! Time formatting for engine arguments

/// Seconds as passed to ffmpeg `-ss` / `-t`, microsecond precision
/// (the resolution ffprobe reports durations in)
pub fn format_seconds_arg(seconds: f64) -> String {
    format!("{:.6}", seconds.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds_arg() {
        assert_eq!(format_seconds_arg(60.0), "60.000000");
        assert_eq!(format_seconds_arg(1.5), "1.500000");
        assert_eq!(format_seconds_arg(-5.0), "0.000000");
    }

    #[test]
    fn test_sub_millisecond_durations_survive() {
        assert_eq!(format_seconds_arg(0.0004), "0.000400");
        assert_eq!(format_seconds_arg(0.000_000_6), "0.000001");
    }
}
