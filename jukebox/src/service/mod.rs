mod host;
mod playback;

pub use host::{Binding, ServiceHost};
pub use playback::{PlaybackService, ProgressSink, SinkId};
