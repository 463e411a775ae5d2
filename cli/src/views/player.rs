use std::cell::{Cell, RefCell};
use std::io;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use jukebox::{
    format_time, Binding, PlaybackPhase, Progress, ProgressSink, ServiceHost, StatusChanged,
    StatusSubscription, TaskId,
};

use crate::state::reducers::AppAction;
use crate::state::store::Store;
use crate::widgets::seek_bar::{ChangeOrigin, SeekBar};
use crate::widgets::util;

use super::{View, ViewType};

/// How far one arrow key press drags the seek bar
pub const SEEK_STEP_MS: u64 = 5_000;

/// What the playback screen shows
#[derive(Clone, Debug)]
pub struct PlayerModel {
    pub seek_bar: SeekBar,
    pub current_label: String,
    pub total_label: String,
}

impl PlayerModel {
    fn new() -> Self {
        Self {
            seek_bar: SeekBar::new(SEEK_STEP_MS),
            current_label: format_time(0),
            total_label: format_time(0),
        }
    }

    fn set_bounds(&mut self, duration_ms: u64) {
        self.seek_bar.set_max(duration_ms);
        self.total_label = format_time(duration_ms);
    }

    fn set_position(&mut self, position_ms: u64) {
        // System update: never turns into a seek
        self.seek_bar.set_progress(position_ms, ChangeOrigin::System);
        self.current_label = format_time(self.seek_bar.progress());
    }
}

/// Service-facing half of the playback screen
///
/// Shared through an `Rc` so the service can push progress into it and the
/// scheduler can run its refresh, both holding only weak references.
pub struct PlayerSession {
    host: Rc<ServiceHost>,
    track: Option<String>,
    binding: RefCell<Option<Binding>>,
    model: RefCell<PlayerModel>,
    refresh: Cell<Option<TaskId>>,
    refresh_generation: Cell<u64>,
    refresh_interval: Duration,
    self_ref: Weak<PlayerSession>,
}

impl PlayerSession {
    pub fn new(host: Rc<ServiceHost>, track: Option<String>) -> Rc<Self> {
        let refresh_interval = host.config().refresh_interval;
        Rc::new_cyclic(|self_ref| Self {
            host,
            track,
            binding: RefCell::new(None),
            model: RefCell::new(PlayerModel::new()),
            refresh: Cell::new(None),
            refresh_generation: Cell::new(0),
            refresh_interval,
            self_ref: self_ref.clone(),
        })
    }

    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.borrow().as_ref().map(Binding::is_bound).unwrap_or(false)
    }

    pub fn model(&self) -> PlayerModel {
        self.model.borrow().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh
            .get()
            .map(|id| self.host.scheduler().is_pending(id))
            .unwrap_or(false)
    }

    pub fn bind(&self) {
        if self.is_bound() {
            return;
        }

        let mut binding = self.host.bind();
        let sink: Weak<dyn ProgressSink> = self.self_ref.clone();
        binding.add_progress_sink(sink);
        let snapshot = binding.snapshot();
        *self.binding.borrow_mut() = Some(binding);

        if self.phase().is_loaded() {
            let mut model = self.model.borrow_mut();
            model.set_bounds(snapshot.duration_ms);
            model.set_position(snapshot.position_ms);
        }
        if snapshot.is_playing {
            self.start_refresh();
        }
    }

    pub fn unbind(&self) {
        self.cancel_refresh();
        let binding = self.binding.borrow_mut().take();
        drop(binding);
    }

    /// Play the preselected track, or resume when there is none
    pub fn play(&self) {
        self.with_binding(|binding| match &self.track {
            Some(name) => binding.play_track(name),
            None => binding.resume(),
        });
        self.ensure_refresh();
    }

    pub fn pause(&self) {
        self.with_binding(Binding::pause);
    }

    pub fn stop(&self) {
        self.with_binding(Binding::stop);
        self.cancel_refresh();

        let snapshot = self.with_binding(Binding::snapshot).unwrap_or_default();
        let mut model = self.model.borrow_mut();
        model.set_bounds(snapshot.duration_ms);
        model.set_position(snapshot.position_ms);
    }

    pub fn seek_forward(&self) {
        if !self.phase().is_loaded() {
            return;
        }
        let target = self.model.borrow_mut().seek_bar.step_forward();
        self.user_seek(target);
    }

    pub fn seek_back(&self) {
        if !self.phase().is_loaded() {
            return;
        }
        let target = self.model.borrow_mut().seek_bar.step_back();
        self.user_seek(target);
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.with_binding(Binding::phase).unwrap_or_default()
    }

    pub fn playing_track(&self) -> Option<String> {
        self.with_binding(Binding::current_track)
            .flatten()
            .map(|track| track.name().to_string())
    }

    fn on_status(&self, status: StatusChanged) {
        if status.is_playing {
            self.ensure_refresh();
        } else {
            self.cancel_refresh();
        }
    }

    fn user_seek(&self, target: Option<u64>) {
        if let Some(position_ms) = target {
            self.with_binding(|binding| binding.seek_to(position_ms));
            self.model.borrow_mut().current_label = format_time(position_ms);
        }
    }

    fn with_binding<T>(&self, f: impl FnOnce(&Binding) -> T) -> Option<T> {
        self.binding.borrow().as_ref().map(f)
    }

    fn ensure_refresh(&self) {
        if !self.is_refreshing() {
            self.start_refresh();
        }
    }

    fn start_refresh(&self) {
        self.cancel_refresh();
        self.refresh_tick(self.refresh_generation.get());
    }

    fn cancel_refresh(&self) {
        self.refresh_generation.set(self.refresh_generation.get() + 1);
        if let Some(id) = self.refresh.take() {
            self.host.scheduler().cancel(id);
        }
    }

    fn refresh_tick(&self, generation: u64) {
        if generation != self.refresh_generation.get() {
            return;
        }
        self.refresh.set(None);

        let Some(snapshot) = self.with_binding(Binding::snapshot) else {
            return;
        };
        if !snapshot.is_playing {
            return;
        }

        {
            let mut model = self.model.borrow_mut();
            model.set_bounds(snapshot.duration_ms);
            model.set_position(snapshot.position_ms);
        }

        let session = self.self_ref.clone();
        let id = self
            .host
            .scheduler()
            .post_delayed(self.refresh_interval, move || {
                if let Some(session) = session.upgrade() {
                    session.refresh_tick(generation);
                }
            });
        self.refresh.set(Some(id));
    }
}

impl ProgressSink for PlayerSession {
    fn on_progress(&self, progress: Progress) {
        let mut model = self.model.borrow_mut();
        model.set_bounds(progress.duration_ms);
        model.set_position(progress.position_ms);
    }
}

/// Transport controls, seek bar and time labels for one track
pub struct PlayerView {
    session: Rc<PlayerSession>,
    subscription: Option<StatusSubscription>,
}

impl PlayerView {
    pub fn new(host: Rc<ServiceHost>, track: Option<String>) -> Self {
        Self {
            session: PlayerSession::new(host, track),
            subscription: None,
        }
    }

    pub fn session(&self) -> &Rc<PlayerSession> {
        &self.session
    }

    fn title(&self) -> String {
        match (self.session.playing_track(), self.session.track()) {
            (Some(playing), _) => playing,
            (None, Some(track)) => track.to_string(),
            (None, None) => "No track selected".to_string(),
        }
    }

    fn phase_text(&self) -> &'static str {
        match self.session.phase() {
            PlaybackPhase::Idle => "Stopped",
            PlaybackPhase::Playing => "Playing",
            PlaybackPhase::Paused => "Paused",
        }
    }
}

impl View for PlayerView {
    fn view_type(&self) -> ViewType {
        ViewType::Player(self.session.track().map(str::to_string))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ]);
        let sections = util::vertically_centered_layout(area, body);
        let model = self.session.model();

        let title = Paragraph::new(Line::from(self.title()).bold()).alignment(Alignment::Center);
        frame.render_widget(title, sections[0]);

        let phase = Paragraph::new(self.phase_text()).alignment(Alignment::Center);
        frame.render_widget(phase, sections[1]);

        let label = format!("{} / {}", model.current_label, model.total_label);
        model.seek_bar.draw(frame, sections[3], label);

        let hints = util::key_hints(&[
            ("p", "play"),
            ("a", "pause"),
            ("s", "stop"),
            ("←/→", "seek"),
            ("esc", "back"),
        ]);
        frame.render_widget(
            Paragraph::new(hints)
                .style(Style::new().dim())
                .alignment(Alignment::Center),
            sections[4],
        );
    }

    fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> io::Result<()> {
        match key_event.code {
            KeyCode::Char('p') | KeyCode::Char(' ') => self.session.play(),
            KeyCode::Char('a') => self.session.pause(),
            KeyCode::Char('s') => self.session.stop(),
            KeyCode::Left => self.session.seek_back(),
            KeyCode::Right => self.session.seek_forward(),
            KeyCode::Esc | KeyCode::Backspace => store.dispatch(AppAction::Back),
            KeyCode::Char('q') => store.dispatch(AppAction::Quit),
            _ => {}
        }
        Ok(())
    }

    fn on_start(&mut self) {
        let session = Rc::downgrade(&self.session);
        self.subscription = Some(self.session.host.broadcast().subscribe(move |status| {
            if let Some(session) = session.upgrade() {
                session.on_status(status);
            }
        }));
        self.session.bind();
    }

    fn on_stop(&mut self) {
        self.subscription = None;
        self.session.unbind();
    }
}

impl Drop for PlayerView {
    fn drop(&mut self) {
        self.subscription = None;
        self.session.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use jukebox::engine::mock::MockEngineBuilder;
    use jukebox::{
        ManualClock, MemoryEngine, PlaybackEngine, Scheduler, ServiceConfig, StatusBroadcast,
    };
    use ratatui::{backend::TestBackend, Terminal};

    const TRACK_MS: u64 = 125_000;

    fn memory_host() -> (Rc<ManualClock>, Rc<ServiceHost>) {
        let clock = Rc::new(ManualClock::new());
        let engine_clock = clock.clone();
        let host = ServiceHost::new(
            ServiceConfig::default(),
            Rc::new(Scheduler::new(clock.clone())),
            StatusBroadcast::new(),
            move || -> Box<dyn PlaybackEngine> {
                Box::new(MemoryEngine::with_tracks(
                    engine_clock.clone(),
                    ["trackA", "trackB"],
                    TRACK_MS,
                ))
            },
        );
        (clock, host)
    }

    fn advance(clock: &ManualClock, host: &ServiceHost, by: Duration) {
        clock.advance(by);
        host.scheduler().run_due();
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_binds_while_visible() {
        let (_, host) = memory_host();
        let mut view = PlayerView::new(host.clone(), Some("trackA".into()));
        assert!(!view.session().is_bound());

        view.on_start();
        assert!(view.session().is_bound());
        assert_eq!(host.bind_count(), 1);

        view.on_stop();
        assert!(!view.session().is_bound());
        assert_eq!(host.bind_count(), 0);
    }

    #[test]
    fn test_play_refreshes_every_second() {
        let (clock, host) = memory_host();
        let store = Store::new();
        let mut view = PlayerView::new(host.clone(), Some("trackB".into()));
        view.on_start();

        view.handle_input(press(KeyCode::Char('p')), &store).unwrap();
        assert!(view.session().is_refreshing());
        assert_eq!(view.session().model().total_label, "02:05");

        advance(&clock, &host, Duration::from_millis(61_000));
        let model = view.session().model();
        assert_eq!(model.current_label, "01:01");
        assert_eq!(model.seek_bar.max(), TRACK_MS);
    }

    #[test]
    fn test_stop_cancels_refresh_and_resets_labels() {
        let (clock, host) = memory_host();
        let store = Store::new();
        let mut view = PlayerView::new(host.clone(), Some("trackA".into()));
        view.on_start();
        view.handle_input(press(KeyCode::Char('p')), &store).unwrap();
        advance(&clock, &host, Duration::from_secs(3));

        view.handle_input(press(KeyCode::Char('s')), &store).unwrap();
        assert!(!view.session().is_refreshing());
        assert_eq!(view.session().phase(), PlaybackPhase::Idle);
        assert_eq!(view.session().model().current_label, "00:00");
        assert_eq!(host.scheduler().pending(), 0);
    }

    #[test]
    fn test_pause_stops_refresh() {
        let (clock, host) = memory_host();
        let store = Store::new();
        let mut view = PlayerView::new(host.clone(), Some("trackA".into()));
        view.on_start();
        view.handle_input(press(KeyCode::Char(' ')), &store).unwrap();
        advance(&clock, &host, Duration::from_secs(2));

        view.handle_input(press(KeyCode::Char('a')), &store).unwrap();
        assert!(!view.session().is_refreshing());
        assert_eq!(view.session().phase(), PlaybackPhase::Paused);

        view.handle_input(press(KeyCode::Char('p')), &store).unwrap();
        assert_eq!(view.session().phase(), PlaybackPhase::Playing);
        assert!(view.session().is_refreshing());
        assert_eq!(view.session().model().current_label, "00:02");
    }

    #[test]
    fn test_arrow_keys_seek() {
        let (clock, host) = memory_host();
        let store = Store::new();
        let mut view = PlayerView::new(host.clone(), Some("trackA".into()));
        view.on_start();
        view.handle_input(press(KeyCode::Char('p')), &store).unwrap();
        advance(&clock, &host, Duration::from_secs(10));

        view.handle_input(press(KeyCode::Right), &store).unwrap();
        let binding = host.bind();
        assert_eq!(binding.current_position(), 15_000);

        view.handle_input(press(KeyCode::Left), &store).unwrap();
        view.handle_input(press(KeyCode::Left), &store).unwrap();
        assert_eq!(binding.current_position(), 5_000);
    }

    #[test]
    fn test_progress_updates_never_seek() {
        let host = ServiceHost::new(
            ServiceConfig::default(),
            Rc::new(Scheduler::new(Rc::new(ManualClock::new()))),
            StatusBroadcast::new(),
            || -> Box<dyn PlaybackEngine> {
                Box::new(MockEngineBuilder::new().duration(TRACK_MS).seek_calls(0).build())
            },
        );
        let mut view = PlayerView::new(host.clone(), Some("jay".into()));
        view.on_start();
        view.session().play();

        for position in (0..TRACK_MS).step_by(1_000) {
            view.session().on_progress(Progress::new(TRACK_MS, position));
        }
        assert_eq!(view.session().model().current_label, "02:04");

        // Tearing down the service verifies the mock's zero-seek expectation
        view.on_stop();
        assert!(!host.is_running());
    }

    #[test]
    fn test_bind_while_playing_initialises_display() {
        let (clock, host) = memory_host();
        let other = host.bind();
        other.play_track("trackB");
        advance(&clock, &host, Duration::from_secs(42));

        let mut view = PlayerView::new(host.clone(), None);
        view.on_start();

        let model = view.session().model();
        assert_eq!(model.total_label, "02:05");
        assert_eq!(model.current_label, "00:42");
        assert!(view.session().is_refreshing());
        assert_eq!(view.title(), "trackB");
    }

    #[test]
    fn test_unknown_duration_shows_position_and_seeks() {
        let host = ServiceHost::new(
            ServiceConfig::default(),
            Rc::new(Scheduler::new(Rc::new(ManualClock::new()))),
            StatusBroadcast::new(),
            || -> Box<dyn PlaybackEngine> {
                Box::new(
                    MockEngineBuilder::new()
                        .duration(0)
                        .position(42_000)
                        .seek_calls(1)
                        .build(),
                )
            },
        );
        let store = Store::new();
        let mut view = PlayerView::new(host.clone(), Some("jay".into()));
        view.on_start();
        view.session().play();

        view.session().on_progress(Progress::new(0, 42_000));
        let model = view.session().model();
        assert_eq!(model.current_label, "00:42");
        assert_eq!(model.total_label, "00:00");

        view.handle_input(press(KeyCode::Right), &store).unwrap();
        assert_eq!(view.session().model().current_label, "00:47");

        // Tearing down the service verifies the single seek
        view.on_stop();
        assert!(!host.is_running());
    }

    #[test]
    fn test_arrow_keys_ignored_while_idle() {
        let (_, host) = memory_host();
        let store = Store::new();
        let mut view = PlayerView::new(host, Some("trackA".into()));
        view.on_start();

        view.handle_input(press(KeyCode::Right), &store).unwrap();
        assert_eq!(view.session().model().current_label, "00:00");
    }

    #[test]
    fn test_bind_while_paused_initialises_display() {
        let (clock, host) = memory_host();
        let other = host.bind();
        other.play_track("trackA");
        advance(&clock, &host, Duration::from_secs(30));
        other.pause();

        let mut view = PlayerView::new(host.clone(), Some("trackA".into()));
        view.on_start();

        let model = view.session().model();
        assert_eq!(model.current_label, "00:30");
        assert_eq!(model.total_label, "02:05");
        assert!(!view.session().is_refreshing());
    }

    #[test]
    fn test_title_follows_playing_track() {
        let (_, host) = memory_host();
        let other = host.bind();
        other.play_track("trackB");

        let mut view = PlayerView::new(host.clone(), Some("trackA".into()));
        view.on_start();
        assert_eq!(view.title(), "trackB");

        other.stop();
        assert_eq!(view.title(), "trackA");

        view.session().play();
        assert_eq!(view.title(), "trackA");
    }

    #[test]
    fn test_play_without_track_resumes() {
        let (_, host) = memory_host();
        let other = host.bind();
        other.play_track("trackA");
        other.pause();

        let mut view = PlayerView::new(host.clone(), None);
        view.on_start();
        view.session().play();
        assert!(other.is_playing());
    }

    #[test]
    fn test_back_and_quit() {
        let (_, host) = memory_host();
        let store = Store::new();
        let mut view = PlayerView::new(host, None);

        view.handle_input(press(KeyCode::Esc), &store).unwrap();
        view.handle_input(press(KeyCode::Char('q')), &store).unwrap();
        assert_eq!(
            store.take_navigation(),
            vec![crate::state::store::Navigation::Pop]
        );
        assert!(store.with_state(|state| state.exit));
    }

    #[test]
    fn test_render() {
        let (_, host) = memory_host();
        let mut view = PlayerView::new(host, Some("trackA".into()));
        view.on_start();
        view.session().play();

        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("trackA"));
        assert!(rendered.contains("Playing"));
        assert!(rendered.contains("00:00 / 02:05"));
    }
}
