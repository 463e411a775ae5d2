pub mod browse;
pub mod player;

use std::io;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::state::store::Store;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewType {
    Browse,
    /// Playback screen with an optional preselected track
    Player(Option<String>),
}

pub trait View {
    fn view_type(&self) -> ViewType;
    fn render(&mut self, frame: &mut Frame, area: Rect);
    fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> io::Result<()>;

    /// The view became the visible one
    fn on_start(&mut self) {}

    /// The view is no longer visible; it may be started again later
    fn on_stop(&mut self) {}
}
