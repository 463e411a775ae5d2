use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use super::{EngineEvent, PlaybackEngine};
use crate::catalog::TrackCatalog;
use crate::error::{EngineError, EngineResult};
use crate::model::Track;
use crate::scheduler::Clock;

/// Engine that plays nothing but keeps time like a real one
///
/// Each known track has a fixed duration. Position advances with the supplied
/// clock while playing, so pairing it with a
/// [`ManualClock`](crate::scheduler::ManualClock) gives fully deterministic
/// playback. Used for headless runs and tests.
pub struct MemoryEngine {
    library: HashMap<String, u64>,
    clock: Rc<dyn Clock>,
    loaded: Option<Loaded>,
}

struct Loaded {
    duration_ms: u64,
    base_ms: u64,
    started_at: Option<Instant>,
}

impl Loaded {
    fn raw_position(&self, now: Instant) -> u64 {
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_millis() as u64)
            .unwrap_or(0);
        self.base_ms.saturating_add(elapsed)
    }

    fn finished(&self, now: Instant) -> bool {
        self.started_at.is_some() && self.raw_position(now) >= self.duration_ms
    }
}

impl MemoryEngine {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            library: HashMap::new(),
            clock,
            loaded: None,
        }
    }

    /// Engine that knows every name in `names`, each lasting `duration_ms`
    pub fn with_tracks<I, S>(clock: Rc<dyn Clock>, names: I, duration_ms: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = Self::new(clock);
        for name in names {
            engine.insert(name, duration_ms);
        }
        engine
    }

    /// Engine that knows every track in `catalog`
    pub fn from_catalog(clock: Rc<dyn Clock>, catalog: &TrackCatalog, duration_ms: u64) -> Self {
        Self::with_tracks(clock, catalog.names(), duration_ms)
    }

    pub fn insert(&mut self, name: impl Into<String>, duration_ms: u64) {
        self.library.insert(name.into(), duration_ms);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }
}

impl PlaybackEngine for MemoryEngine {
    fn load(&mut self, track: &Track) -> EngineResult<()> {
        self.loaded = None;

        let duration_ms = *self
            .library
            .get(track.name())
            .ok_or_else(|| EngineError::ResourceMissing(track.name().to_string()))?;

        if duration_ms == 0 {
            return Err(EngineError::DecodeSetup(format!("{} has no audio frames", track)));
        }

        self.loaded = Some(Loaded {
            duration_ms,
            base_ms: 0,
            started_at: None,
        });
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        let now = self.clock.now();
        let loaded = self.loaded.as_mut().ok_or(EngineError::NotLoaded)?;
        if loaded.started_at.is_none() {
            loaded.started_at = Some(now);
        }
        Ok(())
    }

    fn pause(&mut self) {
        let now = self.clock.now();
        if let Some(loaded) = self.loaded.as_mut() {
            if loaded.started_at.is_some() {
                loaded.base_ms = loaded.raw_position(now).min(loaded.duration_ms);
                loaded.started_at = None;
            }
        }
    }

    fn stop(&mut self) {
        self.loaded = None;
    }

    fn seek(&mut self, position_ms: u64) -> EngineResult<()> {
        let now = self.clock.now();
        let loaded = self.loaded.as_mut().ok_or(EngineError::NotLoaded)?;
        loaded.base_ms = position_ms.min(loaded.duration_ms);
        if loaded.started_at.is_some() {
            loaded.started_at = Some(now);
        }
        Ok(())
    }

    fn position(&self) -> u64 {
        let now = self.clock.now();
        match self.loaded.as_ref() {
            Some(loaded) if loaded.finished(now) => 0,
            Some(loaded) => loaded.raw_position(now),
            None => 0,
        }
    }

    fn duration(&self) -> u64 {
        self.loaded.as_ref().map(|loaded| loaded.duration_ms).unwrap_or(0)
    }

    fn is_playing(&self) -> bool {
        let now = self.clock.now();
        self.loaded
            .as_ref()
            .map(|loaded| loaded.started_at.is_some() && !loaded.finished(now))
            .unwrap_or(false)
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        let now = self.clock.now();
        let loaded = self.loaded.as_mut()?;
        if loaded.finished(now) {
            // Stays loaded so play() restarts from the top
            loaded.base_ms = 0;
            loaded.started_at = None;
            return Some(EngineEvent::Completed);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualClock;
    use std::time::Duration;

    fn engine() -> (Rc<ManualClock>, MemoryEngine) {
        let clock = Rc::new(ManualClock::new());
        let engine = MemoryEngine::with_tracks(clock.clone(), ["jay", "wildfire"], 10_000);
        (clock, engine)
    }

    #[test]
    fn test_load_and_play() {
        let (clock, mut engine) = engine();

        engine.load(&Track::new("jay")).unwrap();
        assert!(!engine.is_playing());
        assert_eq!(engine.duration(), 10_000);

        engine.play().unwrap();
        assert!(engine.is_playing());

        clock.advance(Duration::from_millis(2_500));
        assert_eq!(engine.position(), 2_500);
    }

    #[test]
    fn test_unknown_track_is_missing() {
        let (_, mut engine) = engine();
        let result = engine.load(&Track::new("thunderstruck"));
        assert!(matches!(result, Err(EngineError::ResourceMissing(_))));
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_empty_track_fails_decode_setup() {
        let (_, mut engine) = engine();
        engine.insert("silence", 0);
        let result = engine.load(&Track::new("silence"));
        assert!(matches!(result, Err(EngineError::DecodeSetup(_))));
    }

    #[test]
    fn test_pause_freezes_position() {
        let (clock, mut engine) = engine();
        engine.load(&Track::new("jay")).unwrap();
        engine.play().unwrap();

        clock.advance(Duration::from_millis(3_000));
        engine.pause();
        clock.advance(Duration::from_millis(5_000));
        assert_eq!(engine.position(), 3_000);
        assert!(!engine.is_playing());

        engine.play().unwrap();
        clock.advance(Duration::from_millis(1_000));
        assert_eq!(engine.position(), 4_000);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let (clock, mut engine) = engine();
        engine.load(&Track::new("jay")).unwrap();
        engine.play().unwrap();

        engine.seek(7_000).unwrap();
        clock.advance(Duration::from_millis(500));
        assert_eq!(engine.position(), 7_500);

        engine.pause();
        engine.seek(60_000).unwrap();
        assert_eq!(engine.position(), 10_000);
    }

    #[test]
    fn test_stop_requires_reload() {
        let (_, mut engine) = engine();
        engine.load(&Track::new("jay")).unwrap();
        engine.play().unwrap();
        engine.stop();

        assert_eq!(engine.position(), 0);
        assert_eq!(engine.duration(), 0);
        assert!(matches!(engine.play(), Err(EngineError::NotLoaded)));
    }

    #[test]
    fn test_end_of_stream() {
        let (clock, mut engine) = engine();
        engine.load(&Track::new("wildfire")).unwrap();
        engine.play().unwrap();

        clock.advance(Duration::from_millis(9_999));
        assert_eq!(engine.poll_event(), None);

        clock.advance(Duration::from_millis(1));
        assert!(!engine.is_playing());
        assert_eq!(engine.position(), 0);
        assert_eq!(engine.poll_event(), Some(EngineEvent::Completed));
        assert_eq!(engine.poll_event(), None);

        engine.play().unwrap();
        clock.advance(Duration::from_millis(1_000));
        assert_eq!(engine.position(), 1_000);
    }
}
