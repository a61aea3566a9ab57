//! Chunk length resolution at the request boundary

use tracing::warn;

/// Default and upper bound applied to a caller-supplied chunk length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLengthPolicy {
    pub default_seconds: u32,
    pub max_seconds: u32,
}

impl Default for ChunkLengthPolicy {
    fn default() -> Self {
        Self {
            default_seconds: 60,
            max_seconds: 60,
        }
    }
}

impl ChunkLengthPolicy {
    pub fn new(default_seconds: u32, max_seconds: u32) -> Self {
        Self {
            default_seconds,
            max_seconds,
        }
    }

    /// Resolve a raw request value.
    ///
    /// Absent, unparsable or non-positive values fall back to the default;
    /// values above the bound are clamped to it.
    pub fn resolve(&self, requested: Option<&str>) -> u32 {
        let Some(raw) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.default_seconds;
        };

        match raw.parse::<i64>() {
            Ok(value) if value > 0 => {
                if value > i64::from(self.max_seconds) {
                    warn!(requested = value, max = self.max_seconds, "Clamping chunk length");
                    self.max_seconds
                } else {
                    value as u32
                }
            }
            _ => {
                warn!(requested = raw, default = self.default_seconds, "Ignoring invalid chunk length");
                self.default_seconds
            }
        }
    }
}
