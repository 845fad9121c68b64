use std::sync::Arc;

use crate::error::{PresenterError, StateViolation};
use crate::model::{Question, QuestionKind, Questionnaire, SessionProgress, SessionSummary};
use crate::persist::ProgressStore;
use crate::timer::{Countdown, Tick, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
    Timeout,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No active question; the presenter sees the question grid.
    Idle,
    /// Countdown running, no judgment yet.
    Running { index: usize },
    /// Outcome recorded and the answer revealed.
    Judged { index: usize, outcome: Outcome },
}

impl Phase {
    pub fn active_index(self) -> Option<usize> {
        match self {
            Phase::Idle => None,
            Phase::Running { index } | Phase::Judged { index, .. } => Some(index),
        }
    }
}

/// Presenter actions, as produced by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(usize),
    /// Click on an answer option; judged automatically.
    Choose(usize),
    /// Manual judgment, authoritative while the countdown runs.
    Judge(Outcome),
    Reveal,
    ReturnToGrid,
    Reset,
    Timer(TimerEvent),
}

/// Session state machine for one loaded questionnaire.
///
/// Every change to the session progress is written through the
/// [`ProgressStore`]. A `PresenterError::Storage` result means the change
/// was applied in memory but not persisted; a `PresenterError::State`
/// result means the command was rejected and nothing changed.
pub struct Presenter {
    questionnaire: Questionnaire,
    progress: SessionProgress,
    store: Arc<dyn ProgressStore>,
    countdown: Countdown,
    phase: Phase,
    revealed: bool,
}

impl Presenter {
    /// Resume the stored session for `questionnaire`, or begin a new one.
    ///
    /// A stored session is resumed only if it was created for this
    /// questionnaire with the same questions in the same order. A stale
    /// session that has answers is archived before it is replaced.
    pub fn new(questionnaire: Questionnaire, store: Arc<dyn ProgressStore>) -> Self {
        let (progress, dirty) = match store.load() {
            Some(mut stored) if stored.tracks(&questionnaire) => {
                tracing::info!(session = %stored.session_id, "resuming session");
                let dirty = stored.current_question.take().is_some();
                (stored, dirty)
            }
            Some(stale) => {
                tracing::info!(
                    session = %stale.session_id,
                    "stored session does not match the questionnaire, starting a new one"
                );
                if stale.has_answers() {
                    if let Err(e) = store.append_history(&stale) {
                        tracing::error!("cannot archive stale session: {}", e);
                    }
                }
                (SessionProgress::new(&questionnaire), true)
            }
            None => (SessionProgress::new(&questionnaire), true),
        };

        if dirty {
            if let Err(e) = store.save(&progress) {
                tracing::error!("cannot save session progress: {}", e);
            }
        }

        Self {
            questionnaire,
            progress,
            store,
            countdown: Countdown::default(),
            phase: Phase::Idle,
            revealed: false,
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn summary(&self) -> SessionSummary {
        self.progress.summary()
    }

    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn answer_revealed(&self) -> bool {
        self.revealed
    }

    pub fn active_question(&self) -> Option<(usize, &Question)> {
        let index = self.phase.active_index()?;
        self.questionnaire.question(index).map(|q| (index, q))
    }

    pub fn handle(&mut self, command: Command) -> Result<(), PresenterError> {
        match command {
            Command::Start(index) => self.start_question(index),
            Command::Choose(option) => self.choose_answer(option).map(|_| ()),
            Command::Judge(outcome) => self.judge(outcome),
            Command::Reveal => self.reveal_answer(),
            Command::ReturnToGrid => self.return_to_grid(),
            Command::Reset => self.reset_session(),
            Command::Timer(TimerEvent::Tick { generation }) => {
                self.tick_generation(generation).map(|_| ())
            }
        }
    }

    pub fn start_question(&mut self, index: usize) -> Result<(), PresenterError> {
        if self.phase != Phase::Idle {
            return Err(self.reject(StateViolation::QuestionActive));
        }
        let len = self.questionnaire.questions.len();
        let Some(question) = self.questionnaire.question(index) else {
            return Err(self.reject(StateViolation::IndexOutOfRange { index, len }));
        };
        if self.progress.is_answered(index) {
            return Err(self.reject(StateViolation::AlreadyAnswered(index)));
        }

        let limit = question.time_limit;
        self.countdown.cancel();
        let generation = self.countdown.start(limit);
        self.phase = Phase::Running { index };
        self.revealed = false;
        self.progress.current_question = Some(index);
        tracing::debug!(index, limit, generation, "question started");
        self.persist()
    }

    /// Advance the running countdown by one second.
    pub fn tick(&mut self) -> Result<Tick, PresenterError> {
        self.tick_generation(self.countdown.generation())
    }

    /// Apply a tick from the countdown started as `generation`; ticks from
    /// earlier countdowns are ignored.
    pub fn tick_generation(&mut self, generation: u64) -> Result<Tick, PresenterError> {
        if !matches!(self.phase, Phase::Running { .. }) {
            return Ok(Tick::Ignored);
        }
        let tick = self.countdown.tick(generation);
        if tick == Tick::Expired {
            tracing::debug!("countdown expired");
            self.record(Outcome::Timeout, None)?;
        }
        Ok(tick)
    }

    pub fn judge(&mut self, outcome: Outcome) -> Result<(), PresenterError> {
        if !matches!(self.phase, Phase::Running { .. }) {
            return Err(self.reject(StateViolation::NotRunning));
        }
        self.record(outcome, None)
    }

    /// Judge the active question by the option the presenter clicked.
    pub fn choose_answer(&mut self, option: usize) -> Result<Outcome, PresenterError> {
        let Phase::Running { index } = self.phase else {
            return Err(self.reject(StateViolation::NotRunning));
        };
        let Some(question) = self.questionnaire.question(index) else {
            let len = self.questionnaire.questions.len();
            return Err(self.reject(StateViolation::IndexOutOfRange { index, len }));
        };
        if !question.kind.is_choice() {
            return Err(self.reject(StateViolation::NotAChoiceQuestion(index)));
        }
        let len = match question.kind {
            QuestionKind::TrueFalse => 2,
            _ => question.answers.len(),
        };
        if option >= len {
            return Err(self.reject(StateViolation::OptionOutOfRange { option, len }));
        }

        let outcome = if option == question.correct_answer {
            Outcome::Correct
        } else {
            Outcome::Wrong
        };
        self.record(outcome, Some(option))?;
        Ok(outcome)
    }

    /// Show the correct answer without judging; the countdown keeps running.
    pub fn reveal_answer(&mut self) -> Result<(), PresenterError> {
        if self.phase == Phase::Idle {
            return Err(self.reject(StateViolation::NoActiveQuestion));
        }
        self.revealed = true;
        Ok(())
    }

    /// Leave the active question. A running question is abandoned and stays
    /// unanswered.
    pub fn return_to_grid(&mut self) -> Result<(), PresenterError> {
        match self.phase {
            Phase::Idle => return Err(self.reject(StateViolation::NoActiveQuestion)),
            Phase::Running { index } => {
                self.countdown.cancel();
                tracing::debug!(index, "question abandoned");
            }
            Phase::Judged { .. } => {}
        }
        self.phase = Phase::Idle;
        self.revealed = false;
        self.progress.current_question = None;
        self.persist()
    }

    /// Archive the session if anything was answered and start over.
    ///
    /// If archiving fails nothing changes and the error is returned.
    pub fn reset_session(&mut self) -> Result<(), PresenterError> {
        if self.progress.has_answers() {
            self.store.append_history(&self.progress)?;
        }
        self.countdown.cancel();
        self.progress = SessionProgress::new(&self.questionnaire);
        self.phase = Phase::Idle;
        self.revealed = false;
        tracing::info!(session = %self.progress.session_id, "session reset");
        self.persist()
    }

    fn record(&mut self, outcome: Outcome, selected: Option<usize>) -> Result<(), PresenterError> {
        let Phase::Running { index } = self.phase else {
            return Err(self.reject(StateViolation::NotRunning));
        };
        self.countdown.cancel();
        let time_spent = self.countdown.elapsed();

        if let Some(entry) = self.progress.questions.get_mut(index) {
            entry.answered = true;
            entry.correct = Some(outcome.is_correct());
            entry.time_spent = time_spent;
            entry.selected_answer = selected;
        }
        self.progress.completed = self.progress.questions.iter().all(|p| p.answered);
        self.phase = Phase::Judged { index, outcome };
        self.revealed = true;
        tracing::debug!(index, ?outcome, time_spent, "question judged");
        self.persist()
    }

    fn persist(&self) -> Result<(), PresenterError> {
        self.store.save(&self.progress).map_err(|e| {
            tracing::error!("cannot save session progress: {}", e);
            PresenterError::Storage(e)
        })
    }

    fn reject(&self, violation: StateViolation) -> PresenterError {
        tracing::warn!(phase = ?self.phase, "rejected: {}", violation);
        PresenterError::State(violation)
    }
}
