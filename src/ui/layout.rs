use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub titlebar: Rect,
    pub main: Rect,
    pub statusbar: Rect,
    pub keybar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // titlebar
            Constraint::Min(5),    // grid or active question
            Constraint::Length(1), // statusbar
            Constraint::Length(1), // keybar
        ])
        .split(area);

    AppLayout {
        titlebar: vertical[0],
        main: vertical[1],
        statusbar: vertical[2],
        keybar: vertical[3],
    }
}
