mod playback_state;
mod progress;
mod state_change;
mod track;

pub use playback_state::{PlaybackPhase, PlaybackState};
pub use progress::Progress;
pub use state_change::StatusChanged;
pub use track::Track;
