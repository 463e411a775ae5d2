use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

/// Who moved the bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Keyboard drag; the new position should be sent to the service
    User,
    /// Progress pushed or polled from the service; display only
    System,
}

/// Progress indicator that can also be dragged
///
/// Every position change goes through [`set_progress`](Self::set_progress)
/// together with its origin. Only user changes produce a seek request, so
/// feeding progress from the service back into the bar can never loop into
/// another seek.
#[derive(Clone, Debug)]
pub struct SeekBar {
    max: u64,
    progress: u64,
    step: u64,
}

impl SeekBar {
    pub fn new(step_ms: u64) -> Self {
        Self {
            max: 0,
            progress: 0,
            step: step_ms,
        }
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn progress(&self) -> u64 {
        self.progress
    }

    /// Zero means the length is unknown; progress is then left unbounded
    pub fn set_max(&mut self, max: u64) {
        self.max = max;
        self.progress = self.bounded(self.progress);
    }

    /// Move the bar; returns the position to seek to for user changes
    pub fn set_progress(&mut self, value: u64, origin: ChangeOrigin) -> Option<u64> {
        let value = self.bounded(value);
        let changed = value != self.progress;
        self.progress = value;

        match origin {
            ChangeOrigin::User if changed => Some(value),
            _ => None,
        }
    }

    pub fn step_forward(&mut self) -> Option<u64> {
        self.set_progress(self.progress.saturating_add(self.step), ChangeOrigin::User)
    }

    pub fn step_back(&mut self) -> Option<u64> {
        self.set_progress(self.progress.saturating_sub(self.step), ChangeOrigin::User)
    }

    fn bounded(&self, value: u64) -> u64 {
        if self.max > 0 {
            value.min(self.max)
        } else {
            value
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        (self.progress as f64 / self.max as f64).clamp(0.0, 1.0)
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, label: String) {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(self.ratio())
            .label(label);

        frame.render_widget(gauge, area);
    }
}
