use std::path::PathBuf;
use std::time::Duration;

/// Errors raised by a [`PlaybackEngine`](crate::engine::PlaybackEngine)
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No bundled resource for track: {0}")]
    ResourceMissing(String),

    #[error("Failed to set up decoder: {0}")]
    DecodeSetup(String),

    #[error("No track loaded")]
    NotLoaded,

    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Seek failed: {0}")]
    Seek(String),
}

impl EngineError {
    /// Whether this error belongs to the load failure family
    ///
    /// Missing resources and decoder setup failures are treated the same way
    /// by the service: logged, state left at Idle.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, EngineError::ResourceMissing(_) | EngineError::DecodeSetup(_))
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name} interval: {value:?} (must be greater than zero)")]
    InvalidInterval { name: &'static str, value: Duration },

    #[error("Assets directory not found: {}", .0.display())]
    MissingAssets(PathBuf),
}

/// Top level error for callers embedding the library
#[derive(Debug, thiserror::Error)]
pub enum JukeboxError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JukeboxError> for std::io::Error {
    fn from(error: JukeboxError) -> Self {
        match error {
            JukeboxError::Io(err) => err,
            other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, JukeboxError>;

pub type EngineResult<T> = std::result::Result<T, EngineError>;
