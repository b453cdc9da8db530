use serde::{Deserialize, Serialize};

use crate::grading::{Gradable, Question, QuestionKind};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PageStatus {
    InProgress,
    Submitted {
        /// Reported percentage.
        score: f64,
    },
}

impl PageStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, PageStatus::Submitted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: String,
    pub instance_id: String,
    pub kind: QuestionKind,
    pub weight: f64,
}

impl From<&Question> for QuestionSummary {
    fn from(q: &Question) -> Self {
        QuestionSummary {
            id: q.id().to_string(),
            instance_id: q.instance_id().to_string(),
            kind: q.kind(),
            weight: q.weight(),
        }
    }
}
