mod memory;
mod rodio_engine;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use memory::MemoryEngine;
pub use rodio_engine::RodioEngine;

use crate::error::EngineResult;
use crate::model::Track;

/// Events an engine reports asynchronously to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The stream reached its natural end; the engine is stopped at position 0
    Completed,
}

/// One decodable audio stream with transport controls
///
/// Engines never call back into their owner. Completion is queued and handed
/// out by [`poll_event`](Self::poll_event), which the owner drains on its own
/// thread.
pub trait PlaybackEngine {
    /// Prepare `track` for playback, replacing whatever was loaded
    ///
    /// Fails with [`EngineError::ResourceMissing`](crate::EngineError::ResourceMissing)
    /// when the track has no bundled resource and with
    /// [`EngineError::DecodeSetup`](crate::EngineError::DecodeSetup) when the
    /// resource cannot be decoded. A loaded track starts paused at position 0.
    fn load(&mut self, track: &Track) -> EngineResult<()>;

    /// Start or resume; requires a loaded track
    fn play(&mut self) -> EngineResult<()>;

    fn pause(&mut self);

    /// Stop and release decoder resources; a new `load` is needed afterwards
    fn stop(&mut self);

    fn seek(&mut self, position_ms: u64) -> EngineResult<()>;

    fn position(&self) -> u64;

    /// Duration of the loaded track, 0 when unknown or nothing is loaded
    fn duration(&self) -> u64;

    fn is_playing(&self) -> bool;

    fn poll_event(&mut self) -> Option<EngineEvent>;
}
