use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{QuestionKind, Questionnaire};

/// Check a questionnaire against the document rules.
///
/// Time limits are not checked here; they are coerced into range when the
/// document is read.
pub fn validate(doc: &Questionnaire) -> Result<(), ValidationError> {
    if doc.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    for (index, q) in doc.questions.iter().enumerate() {
        if q.id.trim().is_empty() {
            return Err(ValidationError::MissingQuestionId { index });
        }
        if !q.kind.is_choice() {
            continue;
        }
        let len = if q.kind == QuestionKind::TrueFalse {
            2
        } else {
            q.answers.len()
        };
        if len < 2 {
            return Err(ValidationError::TooFewAnswers { index, count: len });
        }
        if q.correct_answer >= len {
            return Err(ValidationError::CorrectAnswerOutOfRange {
                index,
                correct: q.correct_answer,
                len,
            });
        }
    }

    Ok(())
}

/// Parse a serialized document, accepting it only if it has the minimal
/// shape (id, title, a question list) and passes [`validate`].
pub fn parse_document(content: &str) -> Result<Questionnaire, ValidationError> {
    let raw: Value =
        serde_json::from_str(content).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    check_shape(&raw)?;

    let mut doc: Questionnaire =
        serde_json::from_value(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    doc.normalize();
    validate(&doc)?;
    Ok(doc)
}

fn check_shape(raw: &Value) -> Result<(), ValidationError> {
    let has_text = |field: &str| {
        raw.get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };
    if !raw.is_object() {
        return Err(ValidationError::Malformed("expected a JSON object".into()));
    }
    if !has_text("id") {
        return Err(ValidationError::MissingField("id"));
    }
    if !has_text("title") {
        return Err(ValidationError::MissingField("title"));
    }
    if !raw.get("questions").is_some_and(Value::is_array) {
        return Err(ValidationError::MissingField("questions"));
    }
    Ok(())
}

/// Default file name offered when saving or exporting a document.
pub fn suggested_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_questionnaire.json", stem)
}
