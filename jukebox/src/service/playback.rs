use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::broadcast::StatusBroadcast;
use crate::engine::{EngineEvent, PlaybackEngine};
use crate::model::{PlaybackPhase, PlaybackState, Progress, StatusChanged, Track};
use crate::scheduler::{Scheduler, TaskId};

/// Receiver of progress samples pushed by the service
pub trait ProgressSink {
    fn on_progress(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress),
{
    fn on_progress(&self, progress: Progress) {
        self(progress)
    }
}

/// Identifies a registered progress sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

#[derive(Default)]
struct ServiceState {
    phase: PlaybackPhase,
    current_track: Option<Track>,
    sampler: Option<TaskId>,
    // Bumped whenever the sampler is (re)started or cancelled; a tick
    // carrying an older value is stale and does nothing.
    sampler_generation: u64,
}

/// Owner of the single playback engine
///
/// All methods take `&self` and are meant to be called from the UI thread.
/// No borrow is held while notifying sinks or status listeners, so they may
/// call straight back into the service.
pub struct PlaybackService {
    engine: RefCell<Box<dyn PlaybackEngine>>,
    state: RefCell<ServiceState>,
    sinks: RefCell<Vec<(SinkId, Weak<dyn ProgressSink>)>>,
    next_sink_id: Cell<u64>,
    scheduler: Rc<Scheduler>,
    broadcast: Rc<StatusBroadcast>,
    sample_interval: Duration,
    self_ref: Weak<PlaybackService>,
}

impl PlaybackService {
    pub fn new(
        engine: Box<dyn PlaybackEngine>,
        scheduler: Rc<Scheduler>,
        broadcast: Rc<StatusBroadcast>,
        sample_interval: Duration,
    ) -> Rc<Self> {
        Rc::new_cyclic(|self_ref| Self {
            engine: RefCell::new(engine),
            state: RefCell::new(ServiceState::default()),
            sinks: RefCell::new(Vec::new()),
            next_sink_id: Cell::new(0),
            scheduler,
            broadcast,
            sample_interval,
            self_ref: self_ref.clone(),
        })
    }

    /// Play `name`, resuming instead when it is the paused track
    ///
    /// Playing the track that is already playing is a no-op. Load failures are
    /// logged and leave the service Idle.
    pub fn play_track(&self, name: &str) {
        let (phase, same_track) = {
            let state = self.state.borrow();
            let same = state.current_track.as_ref().map(|t| t == name).unwrap_or(false);
            (state.phase, same)
        };

        match (phase, same_track) {
            (PlaybackPhase::Paused, true) => self.resume(),
            (PlaybackPhase::Playing, true) => {
                log::debug!("{} is already playing", name);
            }
            _ => self.start(Track::new(name)),
        }
    }

    /// Resume the paused track; no-op in any other phase
    pub fn resume(&self) {
        if self.phase() != PlaybackPhase::Paused {
            log::debug!("Resume ignored in {:?}", self.phase());
            return;
        }

        let result = self.engine.borrow_mut().play();
        match result {
            Ok(()) => self.transition(PlaybackPhase::Playing),
            Err(e) => log::error!("Failed to resume playback: {}", e),
        }
    }

    pub fn pause(&self) {
        if self.phase() != PlaybackPhase::Playing {
            return;
        }

        self.engine.borrow_mut().pause();
        self.transition(PlaybackPhase::Paused);
    }

    /// Stop and release the stream; position reads 0 afterwards
    pub fn stop(&self) {
        if !self.phase().is_loaded() {
            return;
        }

        self.engine.borrow_mut().stop();
        self.state.borrow_mut().current_track = None;
        self.transition(PlaybackPhase::Idle);
    }

    /// Seek within the loaded track, clamped to its duration
    pub fn seek_to(&self, position_ms: u64) {
        if !self.phase().is_loaded() {
            log::debug!("Seek to {}ms ignored while idle", position_ms);
            return;
        }

        let mut engine = self.engine.borrow_mut();
        let duration = engine.duration();
        let target = if duration > 0 {
            position_ms.min(duration)
        } else {
            position_ms
        };

        if let Err(e) = engine.seek(target) {
            log::warn!("Seek to {}ms failed: {}", target, e);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == PlaybackPhase::Playing
    }

    pub fn current_position(&self) -> u64 {
        self.snapshot().position_ms
    }

    pub fn duration(&self) -> u64 {
        self.snapshot().duration_ms
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.borrow().phase
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.borrow().current_track.clone()
    }

    pub fn snapshot(&self) -> PlaybackState {
        let phase = self.phase();
        if !phase.is_loaded() {
            return PlaybackState::default();
        }

        let engine = self.engine.borrow();
        let progress = Progress::new(engine.duration(), engine.position());
        PlaybackState {
            is_playing: phase == PlaybackPhase::Playing,
            position_ms: progress.position_ms,
            duration_ms: progress.duration_ms,
        }
    }

    /// Whether a sampler tick is queued
    pub fn is_sampling(&self) -> bool {
        self.state
            .borrow()
            .sampler
            .map(|id| self.scheduler.is_pending(id))
            .unwrap_or(false)
    }

    pub fn add_progress_sink(&self, sink: Weak<dyn ProgressSink>) -> SinkId {
        let id = SinkId(self.next_sink_id.get());
        self.next_sink_id.set(id.0 + 1);
        self.sinks.borrow_mut().push((id, sink));
        id
    }

    pub fn remove_progress_sink(&self, id: SinkId) {
        self.sinks.borrow_mut().retain(|(sink_id, _)| *sink_id != id);
    }

    pub fn progress_sink_count(&self) -> usize {
        self.sinks
            .borrow()
            .iter()
            .filter(|(_, sink)| sink.strong_count() > 0)
            .count()
    }

    /// Drain and apply pending engine events
    pub fn pump_engine_events(&self) {
        loop {
            let event = self.engine.borrow_mut().poll_event();
            match event {
                Some(event) => self.handle_engine_event(event),
                None => break,
            }
        }
    }

    pub fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Completed => {
                if !self.phase().is_loaded() {
                    return;
                }
                log::info!("Playback completed: {:?}", self.current_track());
                // Release the decoder so the next play reloads from the top
                self.engine.borrow_mut().stop();
                self.state.borrow_mut().current_track = None;
                self.transition(PlaybackPhase::Idle);
            }
        }
    }

    /// Stop everything before the service goes away
    pub fn shutdown(&self) {
        log::debug!("Playback service shutting down");
        self.stop();
        self.cancel_sampler();
        self.sinks.borrow_mut().clear();
    }

    fn start(&self, track: Track) {
        let result = {
            let mut engine = self.engine.borrow_mut();
            engine.load(&track).and_then(|()| engine.play())
        };

        match result {
            Ok(()) => {
                log::info!("Playing {}", track);
                self.state.borrow_mut().current_track = Some(track);
                self.transition(PlaybackPhase::Playing);
            }
            Err(e) => {
                if e.is_load_failure() {
                    log::error!("Error playing {}: {}", track, e);
                } else {
                    log::error!("Could not start {}: {}", track, e);
                }
                // The failed load already dropped whatever was loaded before
                self.engine.borrow_mut().stop();
                let was_loaded = self.phase().is_loaded();
                self.state.borrow_mut().current_track = None;
                if was_loaded {
                    self.transition(PlaybackPhase::Idle);
                }
            }
        }
    }

    fn transition(&self, next: PlaybackPhase) {
        let previous = std::mem::replace(&mut self.state.borrow_mut().phase, next);
        log::debug!("Playback phase {:?} -> {:?}", previous, next);

        if next == PlaybackPhase::Playing {
            self.start_sampler();
        } else {
            self.cancel_sampler();
        }

        self.broadcast.publish(StatusChanged {
            is_playing: next == PlaybackPhase::Playing,
        });
    }

    fn start_sampler(&self) {
        self.cancel_sampler();
        let generation = self.state.borrow().sampler_generation;
        // First sample goes out on the next loop pass rather than inline
        self.schedule_sample(Duration::ZERO, generation);
    }

    fn cancel_sampler(&self) {
        let mut state = self.state.borrow_mut();
        state.sampler_generation += 1;
        if let Some(id) = state.sampler.take() {
            self.scheduler.cancel(id);
        }
    }

    fn schedule_sample(&self, delay: Duration, generation: u64) {
        let service = self.self_ref.clone();
        let id = self.scheduler.post_delayed(delay, move || {
            if let Some(service) = service.upgrade() {
                service.sample(generation);
            }
        });
        self.state.borrow_mut().sampler = Some(id);
    }

    fn sample(&self, generation: u64) {
        {
            let mut state = self.state.borrow_mut();
            if state.sampler_generation != generation || state.phase != PlaybackPhase::Playing {
                return;
            }
            state.sampler = None;
        }

        self.pump_engine_events();
        if self.phase() != PlaybackPhase::Playing {
            return;
        }

        let progress = {
            let engine = self.engine.borrow();
            Progress::new(engine.duration(), engine.position())
        };
        self.publish_progress(progress);

        // A sink may have paused or stopped playback
        let still_current = {
            let state = self.state.borrow();
            state.sampler_generation == generation && state.phase == PlaybackPhase::Playing
        };
        if still_current {
            self.schedule_sample(self.sample_interval, generation);
        }
    }

    fn publish_progress(&self, progress: Progress) {
        let live: Vec<Rc<dyn ProgressSink>> = {
            let mut sinks = self.sinks.borrow_mut();
            sinks.retain(|(_, sink)| sink.strong_count() > 0);
            sinks.iter().filter_map(|(_, sink)| sink.upgrade()).collect()
        };

        for sink in live {
            sink.on_progress(progress);
        }
    }
}
