use std::fmt;
use std::str::FromStr;

use crate::service::Binding;

/// Named transport commands coming from outside the screens
///
/// Media keys and other external triggers resolve to one of these and are
/// dispatched against a [`Binding`]. Names are accepted either bare
/// (`"play"`) or fully qualified (`"jukebox.action.PLAY"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportAction {
    Play,
    Pause,
    Stop,
}

impl TransportAction {
    pub const ACTION_PLAY: &'static str = "jukebox.action.PLAY";
    pub const ACTION_PAUSE: &'static str = "jukebox.action.PAUSE";
    pub const ACTION_STOP: &'static str = "jukebox.action.STOP";

    const PREFIX: &'static str = "jukebox.action.";

    pub fn action_name(&self) -> &'static str {
        match self {
            TransportAction::Play => Self::ACTION_PLAY,
            TransportAction::Pause => Self::ACTION_PAUSE,
            TransportAction::Stop => Self::ACTION_STOP,
        }
    }

    /// Footer text shown after the action is dispatched
    pub fn toast(&self) -> &'static str {
        match self {
            TransportAction::Play => "Playback: Play",
            TransportAction::Pause => "Playback: Pause",
            TransportAction::Stop => "Playback: Stop",
        }
    }

    /// Apply the action to the bound service and return its toast text
    ///
    /// Play only resumes; with nothing loaded it does nothing.
    pub fn dispatch(&self, binding: &Binding) -> &'static str {
        log::debug!("Dispatching {}", self.action_name());
        match self {
            TransportAction::Play => binding.resume(),
            TransportAction::Pause => binding.pause(),
            TransportAction::Stop => binding.stop(),
        }
        self.toast()
    }

    /// Parse a name, logging and dropping anything unknown
    pub fn parse_lenient(name: &str) -> Option<Self> {
        match name.parse() {
            Ok(action) => Some(action),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }
}

impl fmt::Display for TransportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transport action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for TransportAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        match short.to_ascii_lowercase().as_str() {
            "play" => Ok(TransportAction::Play),
            "pause" => Ok(TransportAction::Pause),
            "stop" => Ok(TransportAction::Stop),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}
