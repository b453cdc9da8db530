use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CourseResult;
use crate::grading::{round_to_hundredths, AuditRecord, Grade, StudentAnswer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedQuestion {
    pub id: String,
    pub instance_id: String,
    pub weight: f64,
    pub grade: Grade,
}

/// Outcome of grading every question on a lesson page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonReport {
    /// Weighted average in [0, 1], unrounded.
    pub score: f64,
    pub questions: Vec<GradedQuestion>,
}

impl LessonReport {
    /// Percentage rounded to two decimal places, for display and logging.
    pub fn reported_percentage(&self) -> f64 {
        round_to_hundredths(self.score * 100.0)
    }

    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.questions
            .iter()
            .map(|q| q.grade.audit_record(&q.instance_id))
            .collect()
    }
}

/// The form posted when an assessment is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub assessment_type: String,
    /// Percentage rounded to two decimal places.
    pub score: f64,
    pub answers: BTreeMap<String, StudentAnswer>,
    pub xsrf_token: String,
}

impl AssessmentSubmission {
    /// Form field pairs, answers encoded as JSON.
    pub fn form_fields(&self) -> CourseResult<Vec<(&'static str, String)>> {
        Ok(vec![
            ("assessment_type", self.assessment_type.clone()),
            ("score", self.score.to_string()),
            ("answers", serde_json::to_string(&self.answers)?),
            ("xsrf_token", self.xsrf_token.clone()),
        ])
    }
}
