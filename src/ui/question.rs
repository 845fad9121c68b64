use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::model::{Question, QuestionKind};
use crate::state::{Outcome, Phase};
use crate::timer::format_clock;

pub fn draw_question(f: &mut Frame, area: Rect, app: &App) {
    let Some((index, question)) = app.presenter.active_question() else {
        return;
    };
    let total = app.question_count();

    let [header, body] = Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);

    let countdown = app.presenter.countdown();
    let remaining = countdown.remaining();
    let color = if remaining <= 10 { Color::Red } else { Color::Blue };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Question {} of {} ", index + 1, total)),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(countdown.progress().clamp(0.0, 1.0))
        .label(format_clock(remaining));
    f.render_widget(gauge, header);

    let mut lines: Vec<Line> = vec![Line::from("")];

    if let Some(image) = &question.image {
        lines.push(Line::from(Span::styled(
            format!("[image: {}]", image),
            Style::default().fg(Color::Magenta),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        question.prompt.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    let selected = app
        .presenter
        .progress()
        .questions
        .get(index)
        .and_then(|p| p.selected_answer);
    option_lines(&mut lines, question, app.presenter.answer_revealed(), selected);

    lines.push(Line::from(""));
    if let Phase::Judged { outcome, .. } = app.presenter.phase() {
        let (text, color) = match outcome {
            Outcome::Correct => ("✓ Correct!", Color::Green),
            Outcome::Wrong => ("✗ Wrong", Color::Red),
            Outcome::Timeout => ("⏱ Time's up!", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    if app.presenter.answer_revealed() {
        if let Some(answer) = question.correct_text() {
            lines.push(Line::from(format!("Correct answer: {}", answer)));
        }
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, body);
}

fn option_lines(
    lines: &mut Vec<Line<'static>>,
    question: &Question,
    revealed: bool,
    selected: Option<usize>,
) {
    if question.kind == QuestionKind::FreeText {
        lines.push(Line::from(Span::styled(
            "Free-text answer: judge with [c] or [w]",
            Style::default().fg(Color::DarkGray),
        )));
        return;
    }

    for (i, answer) in question.answers.iter().enumerate() {
        let text = match question.kind {
            QuestionKind::ImageChoice => format!("{}) [image] {}", i + 1, answer),
            _ => format!("{}) {}", i + 1, answer),
        };
        let mut style = Style::default();
        if revealed && i == question.correct_answer {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        } else if selected == Some(i) {
            style = style.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT);
        }
        lines.push(Line::from(Span::styled(text, style)));
    }
}
