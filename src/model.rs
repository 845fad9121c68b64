use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const DEFAULT_TIME_LIMIT: u32 = 60;
pub const MIN_TIME_LIMIT: u32 = 10;
pub const MAX_TIME_LIMIT: u32 = 600;

pub const DEFAULT_TITLE: &str = "New Questionnaire";

/// Fixed answer pair of every true-false question.
pub const TRUE_FALSE_ANSWERS: [&str; 2] = ["true", "false"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    ImageChoice,
    TrueFalse,
    #[serde(rename = "text", alias = "free-text")]
    FreeText,
}

impl QuestionKind {
    /// Kinds whose answers are options a presenter can click.
    pub fn is_choice(self) -> bool {
        !matches!(self, QuestionKind::FreeText)
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple choice",
            QuestionKind::ImageChoice => "image choice",
            QuestionKind::TrueFalse => "true/false",
            QuestionKind::FreeText => "free text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question", default)]
    pub prompt: String,
    /// Option texts, or image references for image-choice questions.
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub correct_answer: usize,
    #[serde(
        default = "default_time_limit",
        deserialize_with = "deserialize_time_limit"
    )]
    pub time_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Question {
    pub fn new(kind: QuestionKind) -> Self {
        let answers = match kind {
            QuestionKind::MultipleChoice | QuestionKind::ImageChoice => vec![String::new(); 4],
            QuestionKind::TrueFalse => true_false_answers(),
            QuestionKind::FreeText => Vec::new(),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            prompt: String::new(),
            answers,
            correct_answer: 0,
            time_limit: DEFAULT_TIME_LIMIT,
            image: None,
        }
    }

    pub fn correct_text(&self) -> Option<&str> {
        if self.kind.is_choice() {
            self.answers.get(self.correct_answer).map(String::as_str)
        } else {
            None
        }
    }

    /// Re-establish the per-kind shape after an edit.
    fn normalize(&mut self) {
        self.time_limit = clamp_time_limit(Some(f64::from(self.time_limit)));
        if self.kind == QuestionKind::TrueFalse {
            self.answers = true_false_answers();
        }
    }
}

fn true_false_answers() -> Vec<String> {
    TRUE_FALSE_ANSWERS.iter().map(|s| s.to_string()).collect()
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT
}

/// Coerce a stored time limit into the accepted range.
///
/// Missing, zero, negative or non-numeric values fall back to the default.
/// Numeric strings count as numbers.
pub fn clamp_time_limit(raw: Option<f64>) -> u32 {
    match raw {
        Some(secs) if secs.is_finite() && secs >= 1.0 => {
            (secs.round() as u32).clamp(MIN_TIME_LIMIT, MAX_TIME_LIMIT)
        }
        _ => DEFAULT_TIME_LIMIT,
    }
}

fn deserialize_time_limit<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(clamp_time_limit(raw))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Questionnaire {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            questions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn position(&self, question_id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == question_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description.filter(|d| !d.is_empty());
        self.touch();
    }

    /// Append a question with default content and return its id.
    pub fn add_question(&mut self, kind: QuestionKind) -> String {
        let question = Question::new(kind);
        let id = question.id.clone();
        self.questions.push(question);
        self.touch();
        id
    }

    /// Apply `edit` to the question with `id`. Returns false if there is none.
    pub fn update_question(&mut self, id: &str, edit: impl FnOnce(&mut Question)) -> bool {
        let Some(question) = self.questions.iter_mut().find(|q| q.id == id) else {
            return false;
        };
        edit(question);
        question.normalize();
        self.touch();
        true
    }

    pub fn remove_question(&mut self, id: &str) -> Option<Question> {
        let index = self.position(id)?;
        let removed = self.questions.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn move_question(&mut self, from: usize, to: usize) -> bool {
        if from >= self.questions.len() || to >= self.questions.len() {
            return false;
        }
        if from != to {
            let question = self.questions.remove(from);
            self.questions.insert(to, question);
            self.touch();
        }
        true
    }

    /// Re-establish per-question invariants after reading a document.
    pub fn normalize(&mut self) {
        for question in &mut self.questions {
            question.normalize();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionProgress {
    pub question_id: String,
    pub answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(default)]
    pub time_spent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<usize>,
}

impl QuestionProgress {
    pub fn unanswered(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answered: false,
            correct: None,
            time_spent: 0,
            selected_answer: None,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.answered && self.correct == Some(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub questionnaire_id: String,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub questions: Vec<QuestionProgress>,
    #[serde(rename = "currentQuestionIndex", with = "active_index")]
    pub current_question: Option<usize>,
    #[serde(default)]
    pub completed: bool,
}

impl SessionProgress {
    /// Fresh, fully unanswered progress aligned with `questionnaire`.
    pub fn new(questionnaire: &Questionnaire) -> Self {
        Self {
            questionnaire_id: questionnaire.id.clone(),
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            questions: questionnaire
                .questions
                .iter()
                .map(|q| QuestionProgress::unanswered(q.id.clone()))
                .collect(),
            current_question: None,
            completed: false,
        }
    }

    /// True when this progress was created for `questionnaire` as it is now.
    pub fn tracks(&self, questionnaire: &Questionnaire) -> bool {
        self.questionnaire_id == questionnaire.id
            && self.questions.len() == questionnaire.questions.len()
            && self
                .questions
                .iter()
                .zip(&questionnaire.questions)
                .all(|(p, q)| p.question_id == q.id)
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.questions.get(index).is_some_and(|p| p.answered)
    }

    pub fn has_answers(&self) -> bool {
        self.questions.iter().any(|p| p.answered)
    }

    pub fn summary(&self) -> SessionSummary {
        let mut summary = SessionSummary {
            total: self.questions.len(),
            ..SessionSummary::default()
        };
        for p in self.questions.iter().filter(|p| p.answered) {
            summary.answered += 1;
            summary.time_spent += u64::from(p.time_spent);
            if p.is_correct() {
                summary.correct += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub time_spent: u64,
}

impl SessionSummary {
    pub fn wrong(&self) -> usize {
        self.answered - self.correct
    }
}

/// Archived session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub session: SessionProgress,
    pub completed_at: DateTime<Utc>,
}

/// `-1` on the wire means no active question.
mod active_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match index {
            Some(i) => serializer.serialize_u64(*i as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}
