pub mod app;
pub mod args;
pub mod media_keys;
pub mod state;
pub mod views;
pub mod widgets;

pub use app::App;
pub use args::{Args, EngineKind};
