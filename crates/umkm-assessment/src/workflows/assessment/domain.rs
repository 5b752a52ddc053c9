use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier wrapper for a business assessment.
    AssessmentId
);
string_id!(
    /// Identifier of the questionnaire template an assessment is taken against.
    TemplateId
);
string_id!(QuestionId);
string_id!(
    /// Grouping key for questions; drives the per-category score buckets.
    CategoryId
);
string_id!(RuleId);
string_id!(ResponseId);
string_id!(
    /// Opaque caller identity supplied by the authentication layer.
    UserId
);

/// Grouping label for questions. Does not affect scoring math, only output partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Supported question types. Any unrecognised tag lands on `Unsupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Scale,
    Boolean,
    MultipleChoice,
    Text,
    #[serde(other)]
    Unsupported,
}

impl QuestionKind {
    pub const fn label(self) -> &'static str {
        match self {
            QuestionKind::Scale => "scale",
            QuestionKind::Boolean => "boolean",
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::Text => "text",
            QuestionKind::Unsupported => "unsupported",
        }
    }
}

/// Scale ceiling and choice list metadata attached to a question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<QuestionOptions>,
}

impl Question {
    pub fn category_id(&self) -> &CategoryId {
        &self.category.id
    }
}

/// Answer payload as it arrives from clients: a number, a boolean, a bare string or a
/// `{ "value": n, "label": "..." }` object for multiple-choice selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Boolean(bool),
    Number(f64),
    Choice(ChoiceAnswer),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChoiceAnswer {
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A submitted answer resolved against its question. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: ResponseId,
    pub question: Question,
    #[serde(default)]
    pub answer_value: Option<AnswerValue>,
}

/// Client payload for a single answer prior to question resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    #[serde(default)]
    pub answer_value: Option<AnswerValue>,
}

/// Questionnaire a user fills in during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

impl AssessmentTemplate {
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = Vec::new();
        for question in &self.questions {
            if !categories
                .iter()
                .any(|category| category.id == question.category.id)
            {
                categories.push(question.category.clone());
            }
        }
        categories
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl RecommendationPriority {
    pub const fn label(self) -> &'static str {
        match self {
            RecommendationPriority::High => "high",
            RecommendationPriority::Medium => "medium",
            RecommendationPriority::Low => "low",
        }
    }
}

/// Template-scoped rule table entry. `category_id = None` marks a general rule evaluated
/// against the total score; `None` bounds are unbounded on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRule {
    pub id: RuleId,
    pub template_id: TemplateId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
    pub title: String,
    pub description: String,
    pub priority: RecommendationPriority,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Generated advice record, recreated wholesale on every (re)submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub assessment_id: AssessmentId,
    pub title: String,
    pub description: String,
    pub priority: RecommendationPriority,
    pub category: String,
    pub action_items: Vec<String>,
    pub resources: Vec<String>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = raw.and_then(|value| match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        serde_json::Value::Bool(flag) => Some(if flag { 1.0 } else { 0.0 }),
        _ => None,
    });
    Ok(number.filter(|value| value.is_finite()))
}
