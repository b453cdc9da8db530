use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CourseResult, Error};

/// A score as authored: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl ScoreValue {
    pub fn parse(&self, question: &str) -> CourseResult<f64> {
        let value = match self {
            ScoreValue::Number(n) => Some(*n),
            ScoreValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(Error::InvalidScore {
                question: question.to_string(),
                value: self.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            ScoreValue::Number(n) => write!(f, "{}", n),
            ScoreValue::Text(s) => f.write_str(s),
        }
    }
}

/// Absent or non-numeric weights count as 1.
pub(crate) fn parse_weight(question: &str, weight: Option<&serde_json::Value>) -> CourseResult<f64> {
    let value = match weight {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        None => Ok(1.0),
        Some(w) if w.is_finite() && w >= 0.0 => Ok(w),
        Some(w) => Err(Error::InvalidWeight { question: question.to_string(), value: w }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub score: ScoreValue,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McDefinition {
    pub id: String,
    #[serde(default)]
    pub weight: Option<serde_json::Value>,
    pub choices: Vec<ChoiceDefinition>,
    #[serde(default)]
    pub multiple_selections: bool,
    #[serde(default)]
    pub permute_choices: bool,
    #[serde(default)]
    pub all_or_nothing_grading: bool,
    #[serde(default)]
    pub show_answer_when_incorrect: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    CaseInsensitive,
    Regex,
    Numeric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderDefinition {
    pub matcher: MatcherKind,
    pub response: String,
    pub score: ScoreValue,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaDefinition {
    pub id: String,
    #[serde(default)]
    pub weight: Option<serde_json::Value>,
    pub graders: Vec<GraderDefinition>,
    #[serde(default)]
    pub default_feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeafDefinition {
    MultipleChoice(McDefinition),
    ShortAnswer(SaDefinition),
}

impl LeafDefinition {
    pub fn id(&self) -> &str {
        match self {
            LeafDefinition::MultipleChoice(def) => &def.id,
            LeafDefinition::ShortAnswer(def) => &def.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: String,
    pub questions: Vec<LeafDefinition>,
    /// Child weights keyed by child id.
    #[serde(default)]
    pub weights: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionDefinition {
    MultipleChoice(McDefinition),
    ShortAnswer(SaDefinition),
    QuestionGroup(GroupDefinition),
}
