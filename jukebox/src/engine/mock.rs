use mockall::mock;

use super::{EngineEvent, PlaybackEngine};
use crate::error::{EngineError, EngineResult};
use crate::model::Track;

mock! {
    pub Engine {}

    impl PlaybackEngine for Engine {
        fn load(&mut self, track: &Track) -> EngineResult<()>;
        fn play(&mut self) -> EngineResult<()>;
        fn pause(&mut self);
        fn stop(&mut self);
        fn seek(&mut self, position_ms: u64) -> EngineResult<()>;
        fn position(&self) -> u64;
        fn duration(&self) -> u64;
        fn is_playing(&self) -> bool;
        fn poll_event(&mut self) -> Option<EngineEvent>;
    }
}

/// Builds a [`MockEngine`] with permissive defaults
///
/// Every call succeeds except loading a name outside `known_tracks`, which
/// fails with `ResourceMissing`. Tests that need strict expectations on one
/// method can set `seek_calls` and friends instead of the permissive default.
pub struct MockEngineBuilder {
    known_tracks: Vec<String>,
    position_ms: u64,
    duration_ms: u64,
    seek_calls: Option<usize>,
}

impl MockEngineBuilder {
    pub fn new() -> Self {
        Self {
            known_tracks: vec!["jay".into(), "spacewalk".into()],
            position_ms: 0,
            duration_ms: 180_000,
            seek_calls: None,
        }
    }

    pub fn tracks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_tracks = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn position(mut self, position_ms: u64) -> Self {
        self.position_ms = position_ms;
        self
    }

    pub fn duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Require exactly `times` calls to `seek`
    pub fn seek_calls(mut self, times: usize) -> Self {
        self.seek_calls = Some(times);
        self
    }

    pub fn build(self) -> MockEngine {
        let mut engine = MockEngine::new();
        let known = self.known_tracks;

        engine.expect_load().returning(move |track| {
            if known.iter().any(|name| name == track.name()) {
                Ok(())
            } else {
                Err(EngineError::ResourceMissing(track.name().to_string()))
            }
        });
        engine.expect_play().returning(|| Ok(()));
        engine.expect_pause().return_const(());
        engine.expect_stop().return_const(());
        match self.seek_calls {
            Some(times) => {
                engine.expect_seek().times(times).returning(|_| Ok(()));
            }
            None => {
                engine.expect_seek().returning(|_| Ok(()));
            }
        }
        engine.expect_position().return_const(self.position_ms);
        engine.expect_duration().return_const(self.duration_ms);
        engine.expect_is_playing().return_const(false);
        engine.expect_poll_event().returning(|| None);

        engine
    }
}

impl Default for MockEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
