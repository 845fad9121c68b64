//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// A questionnaire document failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("document is missing `{0}`")]
    MissingField(&'static str),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("question {index} has no id")]
    MissingQuestionId { index: usize },

    #[error("question {index} needs at least 2 answers, has {count}")]
    TooFewAnswers { index: usize, count: usize },

    #[error("question {index}: correct answer {correct} is out of range (0..{len})")]
    CorrectAnswerOutOfRange {
        index: usize,
        correct: usize,
        len: usize,
    },
}

/// Failures of the local cache or the progress store built on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("cannot write `{key}`: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("cannot read `{key}`: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("corrupt entry `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A presenter action that is not valid in the current state.
///
/// These are rejected as no-ops; the state is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateViolation {
    #[error("question index {index} is out of range ({len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("question {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("a question is already active")]
    QuestionActive,

    #[error("no countdown is running")]
    NotRunning,

    #[error("no question is active")]
    NoActiveQuestion,

    #[error("question {0} has no answer options to choose from")]
    NotAChoiceQuestion(usize),

    #[error("option {option} is out of range ({len} options)")]
    OptionOutOfRange { option: usize, len: usize },
}

/// Errors emitted by the session presenter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PresenterError {
    #[error(transparent)]
    State(#[from] StateViolation),

    /// The transition was applied in memory but could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the persistence gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("file dialog failed: {0}")]
    Dialog(String),

    #[error("no questionnaire is loaded")]
    NoDocument,
}
