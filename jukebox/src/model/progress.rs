/// Progress sample pushed by the service sampler to bound screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub duration_ms: u64,
    pub position_ms: u64,
}

impl Progress {
    /// Builds a sample, keeping the position within the known duration
    pub fn new(duration_ms: u64, position_ms: u64) -> Self {
        let position_ms = if duration_ms > 0 {
            position_ms.min(duration_ms)
        } else {
            position_ms
        };
        Self {
            duration_ms,
            position_ms,
        }
    }
}
