use std::path::PathBuf;

use crate::config::Settings;
use crate::error::PresenterError;
use crate::state::{Command, Presenter};

/// Questions per row in the grid view.
pub const GRID_COLUMNS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmReset,
    ConfirmQuit,
    Help,
    Notice(String),
}

/// Terminal view state around the session presenter.
pub struct App {
    pub presenter: Presenter,
    pub cursor: usize,
    pub show_prompts: bool,
    pub dialog_stack: Vec<Dialog>,
    pub should_quit: bool,
    settings_file: Option<PathBuf>,
}

impl App {
    pub fn new(presenter: Presenter) -> Self {
        let cursor = first_open_question(&presenter).unwrap_or(0);
        Self {
            presenter,
            cursor,
            show_prompts: true,
            dialog_stack: Vec::new(),
            should_quit: false,
            settings_file: None,
        }
    }

    /// Start from saved preferences; later changes are written to `path`.
    pub fn with_settings(mut self, settings: Settings, path: PathBuf) -> Self {
        self.show_prompts = settings.show_question_text;
        self.settings_file = Some(path);
        self
    }

    /// Flip prompt text in the grid and remember the choice.
    pub fn toggle_prompts(&mut self) {
        self.show_prompts = !self.show_prompts;
        let Some(path) = &self.settings_file else {
            return;
        };
        let settings = Settings {
            show_question_text: self.show_prompts,
        };
        if let Err(e) = settings.save(path) {
            tracing::warn!(path = %path.display(), "cannot save settings: {}", e);
        }
    }

    /// Forward a command to the presenter. Rejected commands are already
    /// logged by the presenter; persistence failures are shown to the user.
    pub fn apply(&mut self, command: Command) {
        match self.presenter.handle(command) {
            Ok(()) => {}
            Err(PresenterError::State(_)) => {}
            Err(PresenterError::Storage(e)) => {
                self.push_dialog(Dialog::Notice(format!("Progress not saved: {}", e)));
            }
        }
        if command == Command::Reset || command == Command::ReturnToGrid {
            if let Some(next) = first_open_question(&self.presenter) {
                if self.presenter.progress().is_answered(self.cursor) {
                    self.cursor = next;
                }
            }
        }
    }

    pub fn question_count(&self) -> usize {
        self.presenter.questionnaire().questions.len()
    }

    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        let len = self.question_count();
        if len == 0 {
            return;
        }
        let target = self.cursor as isize + dx + dy * GRID_COLUMNS as isize;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }
}

fn first_open_question(presenter: &Presenter) -> Option<usize> {
    presenter.progress().questions.iter().position(|p| !p.answered)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::model::{QuestionKind, Questionnaire};
    use crate::persist::CacheProgressStore;

    fn app() -> App {
        let mut doc = Questionnaire::new("Prefs");
        doc.add_question(QuestionKind::FreeText);
        let store = Arc::new(CacheProgressStore::new(Arc::new(MemoryCache::new())));
        App::new(Presenter::new(doc, store))
    }

    #[test]
    fn prompt_toggle_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut first = app().with_settings(Settings::load(&path), path.clone());
        assert!(first.show_prompts);
        first.toggle_prompts();
        assert!(!first.show_prompts);

        let second = app().with_settings(Settings::load(&path), path);
        assert!(!second.show_prompts);
    }

    #[test]
    fn toggle_without_settings_file_stays_in_memory() {
        let mut app = app();
        app.toggle_prompts();
        assert!(!app.show_prompts);
    }
}
