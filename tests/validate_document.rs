use std::fs;

use hquiz::error::ValidationError;
use hquiz::model::{QuestionKind, Questionnaire};
use hquiz::validate::{parse_document, validate};

fn sample() -> Questionnaire {
    let content =
        fs::read_to_string("fixtures/sample_questionnaire.json").expect("Cannot read fixture");
    parse_document(&content).unwrap()
}

#[test]
fn test_parse_sample_questionnaire() {
    let doc = sample();

    assert_eq!(doc.title, "Rust Basics");
    assert_eq!(doc.description.as_deref(), Some("Warm-up round"));
    assert_eq!(doc.questions.len(), 5);

    let kinds: Vec<QuestionKind> = doc.questions.iter().map(|q| q.kind).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionKind::MultipleChoice,
            QuestionKind::ImageChoice,
            QuestionKind::TrueFalse,
            QuestionKind::FreeText,
            QuestionKind::MultipleChoice,
        ]
    );

    let q1 = &doc.questions[0];
    assert_eq!(q1.prompt, "Which keyword moves a closure's captures by value?");
    assert_eq!(q1.correct_text(), Some("move"));
    assert_eq!(doc.questions[1].image.as_deref(), Some("images/question-mark.png"));
    assert_eq!(doc.questions[3].correct_text(), None);
}

#[test]
fn test_time_limits_are_coerced_on_read() {
    let doc = sample();
    let limits: Vec<u32> = doc.questions.iter().map(|q| q.time_limit).collect();
    // 5 -> 10, 1200 -> 600, missing -> 60
    assert_eq!(limits, vec![60, 10, 600, 60, 30]);

    let doc = parse_document(
        r#"{"id":"q","title":"Limits","questions":[
            {"id":"a","type":"text","timeLimit":"abc"},
            {"id":"b","type":"text","timeLimit":"30"},
            {"id":"c","type":"text","timeLimit":null},
            {"id":"d","type":"text","timeLimit":[5]},
            {"id":"e","type":"text","timeLimit":-4},
            {"id":"f","type":"text","timeLimit":44.6}
        ]}"#,
    )
    .unwrap();
    let limits: Vec<u32> = doc.questions.iter().map(|q| q.time_limit).collect();
    assert_eq!(limits, vec![60, 30, 60, 60, 60, 45]);
}

#[test]
fn test_minimal_document_is_accepted() {
    let doc = parse_document(r#"{"id":"abc","title":"T","questions":[]}"#).unwrap();
    assert_eq!(doc.id, "abc");
    assert_eq!(doc.title, "T");
    assert!(doc.questions.is_empty());
    assert!(doc.description.is_none());
    assert!(doc.created_at <= doc.updated_at);
}

#[test]
fn test_true_false_answers_are_fixed() {
    let doc = sample();
    assert_eq!(doc.questions[2].answers, vec!["true", "false"]);
    assert_eq!(doc.questions[2].correct_text(), Some("false"));
}

#[test]
fn test_validation_rules() {
    let base = sample();

    let mut doc = base.clone();
    doc.title = "   ".into();
    assert_eq!(validate(&doc), Err(ValidationError::EmptyTitle));

    let mut doc = base.clone();
    doc.questions[4].id.clear();
    assert_eq!(
        validate(&doc),
        Err(ValidationError::MissingQuestionId { index: 4 })
    );

    let mut doc = base.clone();
    doc.questions[0].answers.truncate(1);
    doc.questions[0].correct_answer = 0;
    assert_eq!(
        validate(&doc),
        Err(ValidationError::TooFewAnswers { index: 0, count: 1 })
    );

    let mut doc = base.clone();
    doc.questions[4].correct_answer = 3;
    assert_eq!(
        validate(&doc),
        Err(ValidationError::CorrectAnswerOutOfRange {
            index: 4,
            correct: 3,
            len: 3
        })
    );

    let mut doc = base.clone();
    doc.questions[2].correct_answer = 2;
    assert_eq!(
        validate(&doc),
        Err(ValidationError::CorrectAnswerOutOfRange {
            index: 2,
            correct: 2,
            len: 2
        })
    );

    // correct answer is meaningless for free text
    let mut doc = base;
    doc.questions[3].correct_answer = 7;
    assert_eq!(validate(&doc), Ok(()));
}

#[test]
fn test_malformed_documents_are_rejected() {
    assert!(matches!(
        parse_document("{ not json"),
        Err(ValidationError::Malformed(_))
    ));
    assert_eq!(
        parse_document(r#"{"title":"T","questions":[]}"#),
        Err(ValidationError::MissingField("id"))
    );
    // right shape, wrong field type
    assert!(matches!(
        parse_document(
            r#"{"id":"x","title":"T","questions":[{"id":"a","type":"essay"}],
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#
        ),
        Err(ValidationError::Malformed(_))
    ));
}
