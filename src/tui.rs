use std::io;
use std::sync::mpsc;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{App, Dialog};
use crate::state::{Command, Outcome, Phase};
use crate::timer::{Ticker, TimerEvent};

pub fn run_tui(mut app: App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = main_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let (timer_tx, timer_rx) = mpsc::channel::<TimerEvent>();
    let mut ticker: Option<Ticker> = None;

    loop {
        terminal.draw(|f| crate::ui::draw(f, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, app);
                }
            }
        }

        sync_ticker(app, &mut ticker, &timer_tx);

        while let Ok(ev) = timer_rx.try_recv() {
            app.apply(Command::Timer(ev));
        }

        sync_ticker(app, &mut ticker, &timer_tx);
    }

    Ok(())
}

/// Keep exactly one ticker alive for the armed countdown, none otherwise.
fn sync_ticker(app: &App, ticker: &mut Option<Ticker>, tx: &mpsc::Sender<TimerEvent>) {
    let countdown = app.presenter.countdown();
    if countdown.is_armed() {
        let generation = countdown.generation();
        if ticker.as_ref().map(Ticker::generation) != Some(generation) {
            // replacing the old ticker drops and stops it
            *ticker = Some(Ticker::spawn(generation, tx.clone()));
        }
    } else {
        *ticker = None;
    }
}

fn handle_key(key: KeyEvent, app: &mut App) {
    if app.has_dialog() {
        handle_dialog_key(key, app);
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('q') {
        app.push_dialog(Dialog::ConfirmQuit);
        return;
    }
    if key.code == KeyCode::Char('?') {
        app.push_dialog(Dialog::Help);
        return;
    }

    match app.presenter.phase() {
        Phase::Idle => handle_grid_key(key, app),
        Phase::Running { .. } => handle_running_key(key, app),
        Phase::Judged { .. } => handle_judged_key(key, app),
    }
}

fn handle_grid_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Left => app.move_cursor(-1, 0),
        KeyCode::Right | KeyCode::Tab => app.move_cursor(1, 0),
        KeyCode::Up => app.move_cursor(0, -1),
        KeyCode::Down => app.move_cursor(0, 1),
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.question_count().saturating_sub(1),
        KeyCode::Enter | KeyCode::Char(' ') => {
            let index = app.cursor;
            app.apply(Command::Start(index));
        }
        KeyCode::Char('t') => app.toggle_prompts(),
        KeyCode::Char('r') => app.push_dialog(Dialog::ConfirmReset),
        KeyCode::Char('q') => app.push_dialog(Dialog::ConfirmQuit),
        _ => {}
    }
}

fn handle_running_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let option = c as usize - '1' as usize;
            app.apply(Command::Choose(option));
        }
        KeyCode::Char('c') => app.apply(Command::Judge(Outcome::Correct)),
        KeyCode::Char('w') => app.apply(Command::Judge(Outcome::Wrong)),
        KeyCode::Char('s') => app.apply(Command::Reveal),
        KeyCode::Esc | KeyCode::Char('g') => app.apply(Command::ReturnToGrid),
        _ => {}
    }
}

fn handle_judged_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('g') => app.apply(Command::ReturnToGrid),
        _ => {}
    }
}

fn handle_dialog_key(key: KeyEvent, app: &mut App) {
    let Some(dialog) = app.top_dialog().cloned() else {
        return;
    };
    match dialog {
        Dialog::ConfirmReset => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                app.apply(Command::Reset);
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Dialog::ConfirmQuit => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                app.should_quit = true;
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Dialog::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                app.pop_dialog();
            }
        }
        Dialog::Notice(_) => {
            app.pop_dialog();
        }
    }
}
