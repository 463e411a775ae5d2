use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use jukebox::ServiceConfig;
use simplelog::LevelFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Decode bundled files and play them on the default output device
    Rodio,
    /// Silent engine that only keeps time
    Memory,
}

#[derive(Parser, Debug)]
#[command(name = "jukebox")]
#[command(about = "Play bundled audio tracks from the terminal")]
#[command(version)]
pub struct Args {
    /// Directory holding the bundled audio files
    #[arg(long, default_value = jukebox::config::DEFAULT_ASSETS_DIR)]
    pub assets: PathBuf,

    /// Playback engine
    #[arg(long, value_enum, default_value_t = EngineKind::Rodio)]
    pub engine: EngineKind,

    /// File the log is written to; the terminal belongs to the UI
    #[arg(long, default_value = "jukebox.log")]
    pub log_file: PathBuf,

    /// Log level (error, warn, info, debug, trace, off)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Progress sampling interval of the playback service
    #[arg(long, default_value_t = 500)]
    pub sample_interval_ms: u64,

    /// Refresh interval of the playback screen while playing
    #[arg(long, default_value_t = 1000)]
    pub refresh_interval_ms: u64,

    /// Track length used by the memory engine, in seconds
    #[arg(long, default_value_t = 180)]
    pub memory_track_secs: u64,
}

impl Args {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new()
            .with_assets_dir(self.assets.clone())
            .with_sample_interval(Duration::from_millis(self.sample_interval_ms))
            .with_refresh_interval(Duration::from_millis(self.refresh_interval_ms))
    }
}
