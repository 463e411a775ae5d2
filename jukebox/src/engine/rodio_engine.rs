use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::{EngineEvent, PlaybackEngine};
use crate::catalog::TrackCatalog;
use crate::error::{EngineError, EngineResult};
use crate::model::Track;

/// Engine playing bundled files through the default audio device
///
/// The output stream is opened on the first successful decode and kept for
/// the engine's lifetime; each load gets a fresh sink.
pub struct RodioEngine {
    catalog: TrackCatalog,
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    current_file: Option<PathBuf>,
    total_duration: Option<Duration>,
    playing: bool,
}

impl RodioEngine {
    pub fn new(catalog: TrackCatalog) -> Self {
        Self {
            catalog,
            stream: None,
            sink: None,
            current_file: None,
            total_duration: None,
            playing: false,
        }
    }

    pub fn current_file(&self) -> Option<&PathBuf> {
        self.current_file.as_ref()
    }

    fn output_stream(&mut self) -> EngineResult<&OutputStream> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::from_default_device()
                .and_then(|builder| builder.open_stream_or_fallback())
                .map_err(|e| EngineError::Output(e.to_string()))?;
            // The terminal belongs to the UI; nothing may print to stderr
            stream.log_on_drop(false);
            log::info!("Opened default audio output stream");
            self.stream = Some(stream);
        }

        self.stream
            .as_ref()
            .ok_or_else(|| EngineError::Output("output stream unavailable".to_string()))
    }

    fn release_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.current_file = None;
        self.total_duration = None;
        self.playing = false;
    }

    fn reached_end(&self) -> bool {
        self.playing && self.sink.as_ref().map(|sink| sink.empty()).unwrap_or(false)
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, track: &Track) -> EngineResult<()> {
        self.release_sink();

        let path = self
            .catalog
            .resolve(track)
            .ok_or_else(|| EngineError::ResourceMissing(track.name().to_string()))?;

        let file = File::open(&path)
            .map_err(|e| EngineError::DecodeSetup(format!("{}: {}", path.display(), e)))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| EngineError::DecodeSetup(format!("{}: {}", path.display(), e)))?;
        let total_duration = source.total_duration();

        let sink = Sink::connect_new(self.output_stream()?.mixer());
        sink.pause();
        sink.append(source);

        log::debug!(
            "Loaded {} ({:?}) from {}",
            track,
            total_duration,
            path.display()
        );

        self.sink = Some(sink);
        self.current_file = Some(path);
        self.total_duration = total_duration;
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        let sink = self.sink.as_ref().ok_or(EngineError::NotLoaded)?;
        sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        self.playing = false;
    }

    fn stop(&mut self) {
        self.release_sink();
    }

    fn seek(&mut self, position_ms: u64) -> EngineResult<()> {
        let sink = self.sink.as_ref().ok_or(EngineError::NotLoaded)?;
        sink.try_seek(Duration::from_millis(position_ms))
            .map_err(|e| EngineError::Seek(e.to_string()))
    }

    fn position(&self) -> u64 {
        if self.reached_end() {
            return 0;
        }
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos().as_millis() as u64)
            .unwrap_or(0)
    }

    fn duration(&self) -> u64 {
        self.total_duration
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or(0)
    }

    fn is_playing(&self) -> bool {
        self.playing && !self.reached_end()
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        if self.reached_end() {
            log::debug!("End of stream for {:?}", self.current_file);
            self.release_sink();
            return Some(EngineEvent::Completed);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These paths fail before an output device is needed, so they run headless.

    #[test]
    fn test_load_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RodioEngine::new(TrackCatalog::new(dir.path(), ["jay"]));

        match engine.load(&Track::new("jay")) {
            Err(EngineError::ResourceMissing(name)) => assert_eq!(name, "jay"),
            other => panic!("Expected ResourceMissing, got {:?}", other.err()),
        }
        assert!(!engine.is_playing());
        assert_eq!(engine.position(), 0);
        assert_eq!(engine.duration(), 0);
    }

    #[test]
    fn test_load_undecodable_resource() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jay.mp3"), b"definitely not audio").unwrap();
        let mut engine = RodioEngine::new(TrackCatalog::new(dir.path(), ["jay"]));

        let result = engine.load(&Track::new("jay"));
        assert!(matches!(result, Err(EngineError::DecodeSetup(_))));
        assert!(engine.current_file().is_none());
    }

    #[test]
    fn test_transport_without_load() {
        let mut engine = RodioEngine::new(TrackCatalog::with_default_tracks("assets"));

        assert!(matches!(engine.play(), Err(EngineError::NotLoaded)));
        assert!(matches!(engine.seek(1_000), Err(EngineError::NotLoaded)));
        engine.pause();
        engine.stop();
        assert!(!engine.is_playing());
        assert_eq!(engine.poll_event(), None);
    }
}
