/// Phase of the playback service state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackPhase {
    /// Whether a track is loaded in the engine (playing or paused)
    pub fn is_loaded(&self) -> bool {
        !matches!(self, PlaybackPhase::Idle)
    }
}

/// Read-only snapshot of the service state handed to screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}
