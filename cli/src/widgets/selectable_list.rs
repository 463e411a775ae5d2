use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Wrapping single-selection list of labels
#[derive(Clone, Debug)]
pub struct SelectableList {
    title: String,
    labels: Vec<String>,
    state: ListState,
}

impl SelectableList {
    pub fn new(title: &str, labels: Vec<String>) -> Self {
        let mut state = ListState::default();
        if !labels.is_empty() {
            state.select(Some(0));
        }

        Self {
            title: title.to_string(),
            labels,
            state,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .labels
            .iter()
            .map(|label| ListItem::new(label.as_str()))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(self.title.as_str()))
            .highlight_style(Style::new().reversed())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.labels.is_empty() {
            return None;
        }

        let i = self.state.selected().unwrap_or(0);
        let next = (i + 1) % self.labels.len();
        self.state.select(Some(next));
        Some(next)
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.labels.is_empty() {
            return None;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.labels.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        Some(i)
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.state
            .selected()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
