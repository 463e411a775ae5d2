use std::fs::File;
use std::io;
use std::rc::Rc;

use clap::Parser;
use simplelog::{Config, WriteLogger};

use cli::{media_keys, App, Args, EngineKind};
use jukebox::{
    JukeboxError, MemoryEngine, PlaybackEngine, RodioEngine, Scheduler, ServiceHost,
    StatusBroadcast, TrackCatalog,
};

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = args.service_config();
    config.validate().map_err(JukeboxError::from)?;
    if args.engine == EngineKind::Rodio {
        config.validate_assets().map_err(JukeboxError::from)?;
    }

    let catalog = TrackCatalog::with_default_tracks(config.assets_dir.clone());
    let scheduler = Rc::new(Scheduler::system());
    let clock = scheduler.clock();

    log::info!(
        "Starting jukebox with {:?} engine, {} tracks in {}",
        args.engine,
        catalog.len(),
        catalog.assets_dir().display()
    );

    let engine_kind = args.engine;
    let track_ms = args.memory_track_secs.saturating_mul(1000);
    let engine_catalog = catalog.clone();
    let host = ServiceHost::new(
        config,
        scheduler,
        StatusBroadcast::new(),
        move || -> Box<dyn PlaybackEngine> {
            match engine_kind {
                EngineKind::Rodio => Box::new(RodioEngine::new(engine_catalog.clone())),
                EngineKind::Memory => Box::new(MemoryEngine::from_catalog(
                    clock.clone(),
                    &engine_catalog,
                    track_ms,
                )),
            }
        },
    );

    let mut terminal = ratatui::init();
    let supported = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    let media_keys = media_keys::enable(&mut io::stdout(), supported).unwrap_or_else(|e| {
        log::warn!("Failed to enable media keys: {}", e);
        false
    });
    let app_result = App::new(host, &catalog).run(&mut terminal);
    if let Err(e) = media_keys::disable(&mut io::stdout(), media_keys) {
        log::warn!("Failed to restore keyboard flags: {}", e);
    }
    ratatui::restore();

    if let Err(e) = &app_result {
        log::error!("Exited with error: {}", e);
    }
    app_result
}

fn init_logging(args: &Args) -> io::Result<()> {
    let file = File::create(&args.log_file)?;
    WriteLogger::init(args.log_level, Config::default(), file)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
