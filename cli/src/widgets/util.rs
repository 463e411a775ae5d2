use std::rc::Rc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
};

/// Split `layout` inside `area`, padded so the whole block sits in the middle
pub fn vertically_centered_layout(area: Rect, layout: Layout) -> Rc<[Rect]> {
    let height = layout_height(&layout).min(area.height);
    let padding = area.height.saturating_sub(height) / 2;

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    layout.split(outer[1])
}

fn layout_height(layout: &Layout) -> u16 {
    let probe = Rect::new(0, 0, 0, u16::MAX);
    layout.split(probe).iter().map(|section| section.height).sum()
}

/// Footer line listing key bindings, e.g. `[p] play  [s] stop`
pub fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, action) in hints {
        spans.push(Span::styled(format!("[{}]", key), Style::new().bold()));
        spans.push(Span::raw(format!(" {}  ", action)));
    }
    Line::from(spans)
}
