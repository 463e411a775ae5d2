use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MediaKeyCode};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

use jukebox::{ServiceHost, TrackCatalog, TransportAction};

use crate::state::reducers::AppAction;
use crate::state::store::{Navigation, Store};
use crate::views::browse::BrowseView;
use crate::views::player::PlayerView;
use crate::views::{View, ViewType};

/// Longest the loop waits for input when no task is pending
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Screen stack plus the single-threaded event loop
///
/// Each pass waits for a key with a timeout equal to the time until the next
/// scheduled task, handles the key, runs due tasks and redraws.
pub struct App {
    store: Store,
    host: Rc<ServiceHost>,
    views: Vec<Box<dyn View>>,
}

impl App {
    pub fn new(host: Rc<ServiceHost>, catalog: &TrackCatalog) -> Self {
        let mut browse = BrowseView::new(&host, catalog);
        browse.on_start();

        Self {
            store: Store::new(),
            host,
            views: vec![Box::new(browse)],
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.should_exit() {
            terminal.draw(|frame| self.draw(frame))?;

            let timeout = self
                .host
                .scheduler()
                .time_until_next()
                .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));

            if event::poll(timeout)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind == KeyEventKind::Press {
                        self.handle_key(key_event)?;
                    }
                }
            }

            self.tick();
        }

        self.close();
        Ok(())
    }

    pub fn handle_key(&mut self, key_event: KeyEvent) -> io::Result<()> {
        self.store.dispatch(AppAction::ClearToast);

        if let Some(action) = self.transport_action(key_event) {
            self.dispatch_transport(action);
            return Ok(());
        }

        if let Some(view) = self.views.last_mut() {
            view.handle_input(key_event, &self.store)?;
        }
        self.apply_navigation();
        Ok(())
    }

    /// Run scheduled work that is due
    pub fn tick(&self) -> usize {
        self.host.scheduler().run_due()
    }

    pub fn current_view(&self) -> Option<ViewType> {
        self.views.last().map(|view| view.view_type())
    }

    pub fn depth(&self) -> usize {
        self.views.len()
    }

    pub fn should_exit(&self) -> bool {
        self.store.with_state(|state| state.exit)
    }

    pub fn toast(&self) -> Option<String> {
        self.store.with_state(|state| state.toast.clone())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        if let Some(view) = self.views.last_mut() {
            view.render(frame, chunks[0]);
        }

        if let Some(toast) = self.toast() {
            let footer = Paragraph::new(toast).style(Style::default().fg(Color::Yellow));
            frame.render_widget(footer, chunks[1]);
        }
    }

    /// Stop every screen, top first, releasing their bindings
    pub fn close(&mut self) {
        while let Some(mut view) = self.views.pop() {
            view.on_stop();
        }
    }

    fn transport_action(&self, key_event: KeyEvent) -> Option<TransportAction> {
        let KeyCode::Media(media) = key_event.code else {
            return None;
        };

        match media {
            MediaKeyCode::Play => Some(TransportAction::Play),
            MediaKeyCode::Pause => Some(TransportAction::Pause),
            MediaKeyCode::Stop => Some(TransportAction::Stop),
            MediaKeyCode::PlayPause => {
                let binding = self.host.bind();
                if binding.is_playing() {
                    Some(TransportAction::Pause)
                } else {
                    Some(TransportAction::Play)
                }
            }
            _ => None,
        }
    }

    fn dispatch_transport(&self, action: TransportAction) {
        // The browse screen stays bound, so this never restarts the service
        let binding = self.host.bind();
        let toast = action.dispatch(&binding);
        self.store.dispatch(AppAction::ShowToast(toast.to_string()));
    }

    fn apply_navigation(&mut self) {
        for navigation in self.store.take_navigation() {
            match navigation {
                Navigation::Push(ViewType::Player(track)) => {
                    let mut player = PlayerView::new(self.host.clone(), track);
                    // The new screen binds before the old one lets go
                    player.on_start();
                    if let Some(top) = self.views.last_mut() {
                        top.on_stop();
                    }
                    self.views.push(Box::new(player));
                }
                Navigation::Push(ViewType::Browse) => {
                    log::warn!("Browse screen is the root and is never pushed");
                }
                Navigation::Pop => {
                    if self.views.len() <= 1 {
                        continue;
                    }
                    let popped = self.views.pop();
                    if let Some(top) = self.views.last_mut() {
                        top.on_start();
                    }
                    if let Some(mut popped) = popped {
                        popped.on_stop();
                    }
                }
            }
        }
    }
}
