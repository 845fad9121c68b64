use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::timer::format_duration;

pub fn draw_statusbar(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.presenter.summary();

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{} / {} answered", summary.answered, summary.total),
            Style::default().fg(Color::White),
        ),
        Span::raw("   "),
        Span::styled(
            format!("✓ {} correct", summary.correct),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("✗ {} wrong", summary.wrong()),
            Style::default().fg(Color::Red),
        ),
        Span::raw("   "),
        Span::styled(
            format!("⏱ {}", format_duration(summary.time_spent)),
            Style::default().fg(Color::Blue),
        ),
        Span::raw("   "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
