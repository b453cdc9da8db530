use serde::{Deserialize, Serialize};

use super::{round_to_hundredths, Grade, QuestionKind, StudentAnswer};

/// Record handed to the audit log each time a question is graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub instanceid: String,
    pub answer: StudentAnswer,
    /// Rounded to two decimal places.
    pub score: f64,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "individualScores", skip_serializing_if = "Option::is_none")]
    pub individual_scores: Option<Vec<f64>>,
    #[serde(rename = "containedTypes", skip_serializing_if = "Option::is_none")]
    pub contained_types: Option<Vec<QuestionKind>>,
}

impl AuditRecord {
    pub fn new(instance_id: &str, grade: &Grade) -> Self {
        AuditRecord {
            instanceid: instance_id.to_string(),
            answer: grade.answer.clone(),
            score: round_to_hundredths(grade.score),
            kind: grade.kind,
            individual_scores: grade.individual_scores.clone(),
            contained_types: grade.contained_types.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{Feedback, GradeFeedback};
    use serde_json::json;

    #[test]
    fn leaf_record_has_the_fixed_shape() {
        let grade = Grade {
            answer: StudentAnswer::Text { response: "paris".into() },
            score: 2.0 / 3.0,
            feedback: GradeFeedback::Single(Feedback::default()),
            kind: QuestionKind::SaQuestion,
            individual_scores: None,
            contained_types: None,
        };
        assert_eq!(
            serde_json::to_value(grade.audit_record("q3")).unwrap(),
            json!({
                "instanceid": "q3",
                "answer": { "response": "paris" },
                "score": 0.67,
                "type": "SaQuestion"
            })
        );
    }

    #[test]
    fn group_record_carries_child_details() {
        let grade = Grade {
            answer: StudentAnswer::Group(Default::default()),
            score: 1.0 / 6.0,
            feedback: GradeFeedback::PerQuestion(vec![]),
            kind: QuestionKind::QuestionGroup,
            individual_scores: Some(vec![1.0, 0.0]),
            contained_types: Some(vec![QuestionKind::McQuestion, QuestionKind::SaQuestion]),
        };
        let record = serde_json::to_value(grade.audit_record("q1")).unwrap();
        assert_eq!(record["score"], json!(0.17));
        assert_eq!(record["individualScores"], json!([1.0, 0.0]));
        assert_eq!(record["containedTypes"], json!(["McQuestion", "SaQuestion"]));
    }
}
