pub mod broadcast;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod time;
pub mod transport;

// Re-export key types for easier access
pub use broadcast::{StatusBroadcast, StatusSubscription};
pub use catalog::TrackCatalog;
pub use config::ServiceConfig;
pub use engine::{EngineEvent, MemoryEngine, PlaybackEngine, RodioEngine};
pub use error::{ConfigError, EngineError, JukeboxError, Result};
pub use model::{PlaybackPhase, PlaybackState, Progress, StatusChanged, Track};
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TaskId};
pub use service::{Binding, PlaybackService, ProgressSink, ServiceHost, SinkId};
pub use time::format_time;
pub use transport::TransportAction;
