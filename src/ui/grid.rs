use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, GRID_COLUMNS};

pub fn draw_grid(f: &mut Frame, area: Rect, app: &App) {
    let questionnaire = app.presenter.questionnaire();
    let mut title = format!(" {} ", questionnaire.title);
    if let Some(description) = &questionnaire.description {
        title = format!(" {} · {} ", questionnaire.title, description);
    }
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let len = questionnaire.questions.len();
    if len == 0 {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No questions available",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Add questions with `hquiz edit` to start presenting",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        return;
    }

    let cell_height: u16 = if app.show_prompts { 5 } else { 4 };
    let rows = len.div_ceil(GRID_COLUMNS);
    let visible_rows = ((inner.height / cell_height) as usize).max(1);

    // Keep the cursor row on screen
    let cursor_row = app.cursor / GRID_COLUMNS;
    let first_row = cursor_row.saturating_sub(visible_rows - 1);

    let row_areas =
        Layout::vertical(vec![Constraint::Length(cell_height); visible_rows]).split(inner);
    for (slot, row_area) in row_areas.iter().enumerate() {
        let row = first_row + slot;
        if row >= rows {
            break;
        }
        let cells = Layout::horizontal(vec![
            Constraint::Ratio(1, GRID_COLUMNS as u32);
            GRID_COLUMNS
        ])
        .split(*row_area);
        for (col, cell) in cells.iter().enumerate() {
            let index = row * GRID_COLUMNS + col;
            if index >= len {
                break;
            }
            draw_cell(f, *cell, app, index);
        }
    }
}

fn draw_cell(f: &mut Frame, area: Rect, app: &App, index: usize) {
    let questions = &app.presenter.questionnaire().questions;
    let question = &questions[index];
    let progress = app.presenter.progress().questions.get(index);
    let answered = progress.is_some_and(|p| p.answered);
    let correct = progress.is_some_and(|p| p.is_correct());

    let (accent, badge) = match (answered, correct) {
        (true, true) => (Color::Green, "Correct"),
        (true, false) => (Color::Red, "Wrong"),
        (false, _) => (Color::LightBlue, ""),
    };

    let is_current = index == app.cursor;
    let border_style = if is_current {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if answered {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let number_style = if answered {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![Line::from(Span::styled(format!("{}", index + 1), number_style))];

    if app.show_prompts {
        let width = area.width.saturating_sub(2) as usize;
        let prompt = if question.prompt.trim().is_empty() {
            "Untitled question".to_string()
        } else {
            question.prompt.clone()
        };
        let mut text: String = prompt.chars().take(width).collect();
        if prompt.chars().count() > width && width > 0 {
            text.pop();
            text.push('…');
        }
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
    }

    if answered {
        lines.push(Line::from(Span::styled(
            badge,
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("{}s", question.time_limit),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}
