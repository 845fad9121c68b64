use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::state::Phase;
use crate::timer::format_clock;

/// Seconds left at which the countdown turns red.
const WARNING_SECS: u32 = 10;

pub fn draw_titlebar(f: &mut Frame, area: Rect, app: &App) {
    let title = &app.presenter.questionnaire().title;

    let timer_text = match app.presenter.phase() {
        Phase::Running { .. } => {
            let secs = app.presenter.remaining();
            let formatted = format!(" {} ", format_clock(secs));
            if secs <= WARNING_SECS {
                Span::styled(
                    formatted,
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(formatted, Style::default().fg(Color::Rgb(200, 200, 120)))
            }
        }
        _ => Span::raw(""),
    };

    let title_text = format!("[ {} ]", title);
    let title_len = title_text.chars().count();
    let timer_len = timer_text.content.chars().count();
    let title_span = Span::styled(
        title_text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Center the title; the countdown sits at the right edge
    let available = area.width as usize;
    let center_pad = available.saturating_sub(title_len) / 2;
    let right_pad = available.saturating_sub(center_pad + title_len + timer_len);

    let line = Line::from(vec![
        Span::raw(" ".repeat(center_pad)),
        title_span,
        Span::raw(" ".repeat(right_pad)),
        timer_text,
    ]);

    let widget = Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .alignment(Alignment::Left);
    f.render_widget(widget, area);
}
