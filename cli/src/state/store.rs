use std::cell::RefCell;

use crate::views::ViewType;

use super::reducers::{self, AppAction};

/// Navigation request produced by a view, applied by the app loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Push(ViewType),
    Pop,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub navigation: Vec<Navigation>,
    pub toast: Option<String>,
    pub exit: bool,
}

/// Single-threaded store for cross-view app state
///
/// Views never touch each other; they dispatch actions here and the app
/// loop drains the resulting navigation requests after each input.
#[derive(Default)]
pub struct Store {
    state: RefCell<AppState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: AppAction) {
        log::debug!("Dispatching {:?}", action);
        let mut state = self.state.borrow_mut();
        reducers::app_reducer(&mut state, action);
    }

    pub fn with_state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&AppState) -> T,
    {
        let state = self.state.borrow();
        f(&state)
    }

    pub fn take_navigation(&self) -> Vec<Navigation> {
        std::mem::take(&mut self.state.borrow_mut().navigation)
    }
}
