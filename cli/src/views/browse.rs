use std::cell::Cell;
use std::io;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use jukebox::{Binding, ServiceHost, StatusBroadcast, StatusSubscription, TrackCatalog};

use crate::state::reducers::AppAction;
use crate::state::store::Store;
use crate::widgets::selectable_list::SelectableList;
use crate::widgets::util;

use super::{View, ViewType};

/// Track list and coarse playback status
///
/// Holds its binding for its whole life so the service keeps running while
/// the user moves between screens. The status subscription only lives while
/// the view is visible.
pub struct BrowseView {
    list: SelectableList,
    binding: Binding,
    broadcast: Rc<StatusBroadcast>,
    playing: Rc<Cell<bool>>,
    subscription: Option<StatusSubscription>,
}

impl BrowseView {
    pub fn new(host: &ServiceHost, catalog: &TrackCatalog) -> Self {
        Self {
            list: SelectableList::new("Tracks", catalog.names()),
            binding: host.bind(),
            broadcast: host.broadcast().clone(),
            playing: Rc::new(Cell::new(false)),
            subscription: None,
        }
    }

    pub fn status_text(&self) -> &'static str {
        if self.playing.get() {
            "playing"
        } else {
            "stopped"
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn selected_track(&self) -> Option<&str> {
        self.list.selected_label()
    }
}

impl View for BrowseView {
    fn view_type(&self) -> ViewType {
        ViewType::Browse
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let status_color = if self.playing.get() {
            Color::Green
        } else {
            Color::DarkGray
        };
        let status = Line::from(vec![
            Span::raw("Playback status: "),
            Span::styled(self.status_text(), Style::default().fg(status_color)),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        self.list.draw(frame, chunks[1]);

        let hints = util::key_hints(&[
            ("↑/↓", "select"),
            ("enter", "play"),
            ("o", "open player"),
            ("q", "quit"),
        ]);
        frame.render_widget(Paragraph::new(hints), chunks[2]);
    }

    fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> io::Result<()> {
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.previous();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.next();
            }
            KeyCode::Enter => {
                if let Some(name) = self.list.selected_label() {
                    store.dispatch(AppAction::OpenPlayer(Some(name.to_string())));
                }
            }
            KeyCode::Char('o') => {
                store.dispatch(AppAction::OpenPlayer(None));
            }
            KeyCode::Char('q') => {
                store.dispatch(AppAction::Quit);
            }
            _ => {}
        }
        Ok(())
    }

    fn on_start(&mut self) {
        let playing = self.playing.clone();
        self.subscription = Some(
            self.broadcast
                .subscribe(move |status| playing.set(status.is_playing)),
        );
        // Whatever was broadcast while hidden was missed; read it directly
        self.playing.set(self.binding.is_playing());
    }

    fn on_stop(&mut self) {
        self.subscription = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use jukebox::{ManualClock, MemoryEngine, PlaybackEngine, Scheduler, ServiceConfig};
    use ratatui::{backend::TestBackend, Terminal};

    fn host() -> Rc<ServiceHost> {
        let clock = Rc::new(ManualClock::new());
        let engine_clock = clock.clone();
        ServiceHost::new(
            ServiceConfig::default(),
            Rc::new(Scheduler::new(clock)),
            StatusBroadcast::new(),
            move || -> Box<dyn PlaybackEngine> {
                Box::new(MemoryEngine::with_tracks(
                    engine_clock.clone(),
                    ["trackA", "trackB"],
                    60_000,
                ))
            },
        )
    }

    fn catalog() -> TrackCatalog {
        TrackCatalog::new("assets", ["trackA", "trackB"])
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_opens_player_with_selection() {
        let host = host();
        let store = Store::new();
        let mut view = BrowseView::new(&host, &catalog());

        view.handle_input(press(KeyCode::Down), &store).unwrap();
        assert_eq!(view.selected_track(), Some("trackB"));
        view.handle_input(press(KeyCode::Enter), &store).unwrap();

        store.with_state(|state| {
            assert_eq!(state.navigation.len(), 1);
        });
        assert_eq!(
            store.take_navigation(),
            vec![crate::state::store::Navigation::Push(ViewType::Player(Some(
                "trackB".to_string()
            )))]
        );
    }

    #[test]
    fn test_open_player_without_track() {
        let host = host();
        let store = Store::new();
        let mut view = BrowseView::new(&host, &catalog());

        view.handle_input(press(KeyCode::Char('o')), &store).unwrap();
        assert_eq!(
            store.take_navigation(),
            vec![crate::state::store::Navigation::Push(ViewType::Player(None))]
        );
    }

    #[test]
    fn test_status_follows_broadcast_while_visible() {
        let host = host();
        let mut view = BrowseView::new(&host, &catalog());
        view.on_start();
        assert_eq!(view.status_text(), "stopped");

        let player = host.bind();
        player.play_track("trackA");
        assert_eq!(view.status_text(), "playing");

        view.on_stop();
        assert!(!view.is_subscribed());
        player.stop();
        assert_eq!(view.status_text(), "playing");

        // Back on screen: the direct read catches up
        view.on_start();
        assert_eq!(view.status_text(), "stopped");
    }

    #[test]
    fn test_binding_keeps_service_alive() {
        let host = host();
        let view = BrowseView::new(&host, &catalog());
        assert_eq!(host.bind_count(), 1);

        drop(view);
        assert!(!host.is_running());
    }

    #[test]
    fn test_render() {
        let host = host();
        let mut view = BrowseView::new(&host, &catalog());
        view.on_start();

        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("Playback status: stopped"));
        assert!(rendered.contains("trackA"));
    }
}
