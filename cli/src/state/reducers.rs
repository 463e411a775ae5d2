use crate::views::ViewType;

use super::store::{AppState, Navigation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Open the playback screen, optionally with a preselected track
    OpenPlayer(Option<String>),
    Back,
    Quit,
    ShowToast(String),
    ClearToast,
}

pub fn app_reducer(state: &mut AppState, action: AppAction) {
    match action {
        AppAction::OpenPlayer(track) => {
            log::debug!("OpenPlayer action received: {:?}", track);
            state.navigation.push(Navigation::Push(ViewType::Player(track)));
        }
        AppAction::Back => {
            state.navigation.push(Navigation::Pop);
        }
        AppAction::Quit => {
            log::debug!("Quit action received");
            state.exit = true;
        }
        AppAction::ShowToast(message) => {
            state.toast = Some(message);
        }
        AppAction::ClearToast => {
            state.toast = None;
        }
    }
}
