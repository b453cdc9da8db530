mod report;

pub use report::{AssessmentSubmission, GradedQuestion, LessonReport};

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::{CourseResult, Error};
use crate::grading::{
    Gradable, McQuestion, Question, QuestionDefinition, RandomSource, SaQuestion, StudentAnswer,
    EPSILON,
};

/// Hands out unique instance ids for rendered questions.
#[derive(Debug, Clone)]
pub struct InstanceIds {
    prefix: String,
    next: usize,
}

impl InstanceIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        InstanceIds { prefix: prefix.into(), next: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// `Σ w·s / (Σ w + ε)`; zero when there is nothing to weigh.
pub fn weighted_score(questions: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (score_total, weight_total) = questions
        .into_iter()
        .fold((0.0, 0.0), |(s, w), (weight, score)| (s + weight * score, w + weight));
    score_total / (weight_total + EPSILON)
}

/// The questions of one lesson or assessment page.
#[derive(Debug, Clone)]
pub struct Page {
    title: String,
    assessment_type: Option<String>,
    questions: Vec<Question>,
}

impl Page {
    pub fn new(
        title: impl Into<String>,
        assessment_type: Option<String>,
        definitions: &[QuestionDefinition],
        ids: &mut InstanceIds,
        random: &mut dyn RandomSource,
    ) -> CourseResult<Self> {
        let mut next_id = || ids.next_id();
        let mut questions = Vec::with_capacity(definitions.len());
        for def in definitions {
            questions.push(Question::build(def, &mut next_id, random)?);
        }

        let mut seen = HashSet::new();
        for id in questions.iter().flat_map(|q| q.ids()) {
            if !seen.insert(id) {
                return Err(Error::DuplicateId(id.to_string()));
            }
        }
        debug!(count = questions.len(), "built page questions");

        Ok(Page { title: title.into(), assessment_type, questions })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn assessment_type(&self) -> Option<&str> {
        self.assessment_type.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Looks through top-level questions and group children.
    pub fn multiple_choice_mut(&mut self, id: &str) -> CourseResult<&mut McQuestion> {
        self.questions
            .iter_mut()
            .find_map(|q| q.multiple_choice_mut(id))
            .ok_or_else(|| Error::UnknownQuestion(id.to_string()))
    }

    pub fn short_answer_mut(&mut self, id: &str) -> CourseResult<&mut SaQuestion> {
        self.questions
            .iter_mut()
            .find_map(|q| q.short_answer_mut(id))
            .ok_or_else(|| Error::UnknownQuestion(id.to_string()))
    }

    pub fn answers(&self) -> BTreeMap<String, StudentAnswer> {
        self.questions
            .iter()
            .map(|q| (q.id().to_string(), q.student_answer()))
            .collect()
    }

    /// Restores saved answers question by question. Entries of an unknown
    /// shape are skipped. Returns the ids that accepted their answer.
    pub fn restore_answers(&mut self, answers: &BTreeMap<String, Value>) -> Vec<String> {
        self.questions
            .iter_mut()
            .filter_map(|q| {
                let answer = answers.get(q.id()).and_then(StudentAnswer::from_json);
                let applied = q.set_student_answer(answer.as_ref());
                applied.then(|| q.id().to_string())
            })
            .collect()
    }

    pub fn grade_lesson(&self) -> LessonReport {
        let graded: Vec<GradedQuestion> = self
            .questions
            .iter()
            .map(|q| GradedQuestion {
                id: q.id().to_string(),
                instance_id: q.instance_id().to_string(),
                weight: q.weight(),
                grade: q.grade(),
            })
            .collect();
        let score = weighted_score(graded.iter().map(|g| (g.weight, g.grade.score)));
        LessonReport { score, questions: graded }
    }

    pub fn submit(&self, xsrf_token: impl Into<String>) -> AssessmentSubmission {
        let report = self.grade_lesson();
        AssessmentSubmission {
            assessment_type: self.assessment_type.clone().unwrap_or_default(),
            score: report.reported_percentage(),
            answers: self.answers(),
            xsrf_token: xsrf_token.into(),
        }
    }

    pub fn make_read_only(&mut self) {
        self.questions.iter_mut().for_each(|q| q.make_read_only());
    }
}
