use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::broadcast::StatusBroadcast;
use crate::config::ServiceConfig;
use crate::engine::PlaybackEngine;
use crate::model::{PlaybackPhase, PlaybackState, Track};
use crate::scheduler::Scheduler;

use super::playback::{PlaybackService, ProgressSink, SinkId};

type EngineFactory = Box<dyn Fn() -> Box<dyn PlaybackEngine>>;

/// Owns the lifetime of the one [`PlaybackService`]
///
/// The service is created on the first [`bind`](Self::bind) and shut down
/// when the last [`Binding`] goes away. Binding again afterwards creates a
/// fresh service with a fresh engine.
pub struct ServiceHost {
    factory: EngineFactory,
    scheduler: Rc<Scheduler>,
    broadcast: Rc<StatusBroadcast>,
    config: ServiceConfig,
    service: RefCell<Option<Rc<PlaybackService>>>,
    bind_count: Cell<usize>,
    self_ref: Weak<ServiceHost>,
}

impl ServiceHost {
    pub fn new<F>(
        config: ServiceConfig,
        scheduler: Rc<Scheduler>,
        broadcast: Rc<StatusBroadcast>,
        factory: F,
    ) -> Rc<Self>
    where
        F: Fn() -> Box<dyn PlaybackEngine> + 'static,
    {
        Rc::new_cyclic(|self_ref| Self {
            factory: Box::new(factory),
            scheduler,
            broadcast,
            config,
            service: RefCell::new(None),
            bind_count: Cell::new(0),
            self_ref: self_ref.clone(),
        })
    }

    pub fn bind(&self) -> Binding {
        let service = self
            .service
            .borrow_mut()
            .get_or_insert_with(|| {
                log::info!("Starting playback service");
                PlaybackService::new(
                    (self.factory)(),
                    self.scheduler.clone(),
                    self.broadcast.clone(),
                    self.config.sample_interval,
                )
            })
            .clone();

        self.bind_count.set(self.bind_count.get() + 1);
        log::debug!("Service bound ({} binding(s))", self.bind_count.get());

        Binding {
            host: self.self_ref.clone(),
            service: Some(service),
            sinks: Vec::new(),
        }
    }

    pub fn bind_count(&self) -> usize {
        self.bind_count.get()
    }

    /// Whether a service instance currently exists
    pub fn is_running(&self) -> bool {
        self.service.borrow().is_some()
    }

    pub fn broadcast(&self) -> &Rc<StatusBroadcast> {
        &self.broadcast
    }

    pub fn scheduler(&self) -> &Rc<Scheduler> {
        &self.scheduler
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn release(&self) {
        let remaining = self.bind_count.get().saturating_sub(1);
        self.bind_count.set(remaining);
        log::debug!("Service unbound ({} binding(s))", remaining);

        if remaining == 0 {
            let service = self.service.borrow_mut().take();
            if let Some(service) = service {
                log::info!("Last binding released, stopping playback service");
                service.shutdown();
            }
        }
    }
}

/// A screen's connection to the running service
///
/// Transport calls on an unbound `Binding` do nothing and queries return
/// neutral values, so a screen never has to guard its own calls. Dropping
/// the binding unbinds it.
pub struct Binding {
    host: Weak<ServiceHost>,
    service: Option<Rc<PlaybackService>>,
    sinks: Vec<SinkId>,
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        self.service.is_some()
    }

    /// Detach from the service, removing any progress sinks registered here
    pub fn unbind(&mut self) {
        let Some(service) = self.service.take() else {
            return;
        };

        for id in self.sinks.drain(..) {
            service.remove_progress_sink(id);
        }
        drop(service);

        if let Some(host) = self.host.upgrade() {
            host.release();
        }
    }

    /// Register a sink for pushed progress while this binding lives
    pub fn add_progress_sink(&mut self, sink: Weak<dyn ProgressSink>) -> Option<SinkId> {
        let service = self.service.as_ref()?;
        let id = service.add_progress_sink(sink);
        self.sinks.push(id);
        Some(id)
    }

    pub fn play_track(&self, name: &str) {
        if let Some(service) = &self.service {
            service.play_track(name);
        }
    }

    pub fn resume(&self) {
        if let Some(service) = &self.service {
            service.resume();
        }
    }

    pub fn pause(&self) {
        if let Some(service) = &self.service {
            service.pause();
        }
    }

    pub fn stop(&self) {
        if let Some(service) = &self.service {
            service.stop();
        }
    }

    pub fn seek_to(&self, position_ms: u64) {
        if let Some(service) = &self.service {
            service.seek_to(position_ms);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.service.as_ref().map(|s| s.is_playing()).unwrap_or(false)
    }

    pub fn current_position(&self) -> u64 {
        self.service.as_ref().map(|s| s.current_position()).unwrap_or(0)
    }

    pub fn duration(&self) -> u64 {
        self.service.as_ref().map(|s| s.duration()).unwrap_or(0)
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.service.as_ref().map(|s| s.phase()).unwrap_or_default()
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.service.as_ref().map(|s| s.snapshot()).unwrap_or_default()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.service.as_ref().and_then(|s| s.current_track())
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("bound", &self.is_bound())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
