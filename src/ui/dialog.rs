use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, Dialog};

pub fn draw_dialog(f: &mut Frame, area: Rect, app: &App) {
    let Some(dialog) = app.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmReset => draw_confirm_reset(f, area, app),
        Dialog::ConfirmQuit => draw_confirm_quit(f, area),
        Dialog::Help => draw_help(f, area),
        Dialog::Notice(message) => draw_notice(f, area, message),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn confirm_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_confirm_reset(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.presenter.summary();
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Restart the session?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if summary.answered > 0 {
        lines.push(Line::from(format!(
            "   {} answered questions go to history.",
            summary.answered
        )));
    } else {
        lines.push(Line::from("   Nothing answered yet."));
    }
    lines.push(Line::from(""));
    lines.push(confirm_line());
    lines.push(Line::from(""));

    let rect = centered_rect(46, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_confirm_quit(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Quit presenting?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   Progress is saved; the session resumes"),
        Line::from("   next time this questionnaire is presented."),
        Line::from(""),
        confirm_line(),
        Line::from(""),
    ];

    let rect = centered_rect(50, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let key = |k: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(
                format!("   {:<10}", k),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(action),
        ])
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Grid",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        key("arrows", "select question"),
        key("Enter", "start question"),
        key("t", "show/hide question text"),
        key("r", "restart session"),
        Line::from(""),
        Line::from(Span::styled(
            "   Question",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        key("1-9", "pick answer option"),
        key("c / w", "judge correct / wrong"),
        key("s", "show answer"),
        key("Esc", "back to grid"),
        Line::from(""),
        key("Ctrl+Q", "quit"),
        Line::from(""),
    ];

    let rect = centered_rect(48, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default().borders(Borders::ALL).title(" Help ");
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_notice(f: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " [any key] Dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let rect = centered_rect(60, 8, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), rect);
}
