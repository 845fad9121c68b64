use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::state::Phase;

pub fn draw_keybar(f: &mut Frame, area: Rect, app: &App) {
    let choice = app
        .presenter
        .active_question()
        .is_some_and(|(_, q)| q.kind.is_choice());

    let bindings: Vec<(&str, &str)> = match app.presenter.phase() {
        Phase::Idle => vec![
            ("arrows", "select"),
            ("Enter", "start"),
            ("t", "question text"),
            ("r", "restart session"),
            ("q", "quit"),
        ],
        Phase::Running { .. } if choice => vec![
            ("1-9", "answer"),
            ("c", "correct"),
            ("w", "wrong"),
            ("s", "show answer"),
            ("Esc", "back to grid"),
        ],
        Phase::Running { .. } => vec![
            ("c", "correct"),
            ("w", "wrong"),
            ("s", "show answer"),
            ("Esc", "back to grid"),
        ],
        Phase::Judged { .. } => vec![("Enter", "back to grid"), ("Ctrl+Q", "quit")],
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
