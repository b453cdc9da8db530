mod answer;
mod audit;
mod definition;
mod group;
mod multiple_choice;
mod random;
mod short_answer;

pub use answer::StudentAnswer;
pub use audit::AuditRecord;
pub use definition::{
    ChoiceDefinition, GraderDefinition, GroupDefinition, LeafDefinition, MatcherKind,
    McDefinition, QuestionDefinition, SaDefinition, ScoreValue,
};
pub use group::QuestionGroup;
pub use multiple_choice::{Choice, McQuestion};
pub use random::{identity_permutation, random_permutation, RandomSource, RngSource};
pub use short_answer::{GraderRule, Matcher, SaQuestion};

use serde::{Deserialize, Serialize};

use crate::error::CourseResult;

/// Keeps weight denominators away from zero without visibly moving a score.
pub const EPSILON: f64 = 1e-12;

/// Scores above this count as fully correct.
const CORRECT_THRESHOLD: f64 = 0.99;
/// Scores below this count as incorrect.
const INCORRECT_THRESHOLD: f64 = 0.01;

pub fn clamp_score(score: f64) -> f64 {
    score.max(0.0).min(1.0)
}

/// Rounding used for externally reported scores only.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    McQuestion,
    SaQuestion,
    QuestionGroup,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            QuestionKind::McQuestion => f.write_str("multiple choice"),
            QuestionKind::SaQuestion => f.write_str("short answer"),
            QuestionKind::QuestionGroup => f.write_str("question group"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    PartiallyCorrect,
    Incorrect,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score > CORRECT_THRESHOLD {
            Verdict::Correct
        } else if score < INCORRECT_THRESHOLD {
            Verdict::Incorrect
        } else {
            Verdict::PartiallyCorrect
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Verdict::Correct => f.write_str("Correct"),
            Verdict::PartiallyCorrect => f.write_str("Partially correct"),
            Verdict::Incorrect => f.write_str("Incorrect"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub correct_answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeFeedback {
    Single(Feedback),
    PerQuestion(Vec<Feedback>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub answer: StudentAnswer,
    pub score: f64,
    pub feedback: GradeFeedback,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "individualScores", skip_serializing_if = "Option::is_none")]
    pub individual_scores: Option<Vec<f64>>,
    #[serde(rename = "containedTypes", skip_serializing_if = "Option::is_none")]
    pub contained_types: Option<Vec<QuestionKind>>,
}

impl Grade {
    pub(crate) fn leaf(answer: StudentAnswer, score: f64, feedback: Feedback, kind: QuestionKind) -> Self {
        Grade {
            answer,
            score,
            feedback: GradeFeedback::Single(feedback),
            kind,
            individual_scores: None,
            contained_types: None,
        }
    }

    pub fn audit_record(&self, instance_id: &str) -> AuditRecord {
        AuditRecord::new(instance_id, self)
    }
}

/// Capabilities shared by every question variant.
pub trait Gradable {
    fn id(&self) -> &str;
    fn instance_id(&self) -> &str;
    fn kind(&self) -> QuestionKind;
    fn weight(&self) -> f64;
    fn grade(&self) -> Grade;
    fn student_answer(&self) -> StudentAnswer;
    /// Restores a saved answer. Returns false and leaves the question
    /// untouched when the answer is missing or has the wrong shape.
    fn set_student_answer(&mut self, answer: Option<&StudentAnswer>) -> bool;
    fn make_read_only(&mut self);
}

#[derive(Debug, Clone)]
pub enum LeafQuestion {
    MultipleChoice(McQuestion),
    ShortAnswer(SaQuestion),
}

impl LeafQuestion {
    pub fn build(
        definition: &LeafDefinition,
        instance_id: String,
        weight: f64,
        random: &mut dyn RandomSource,
    ) -> CourseResult<Self> {
        Ok(match definition {
            LeafDefinition::MultipleChoice(def) => {
                LeafQuestion::MultipleChoice(McQuestion::new(def, instance_id, weight, random)?)
            }
            LeafDefinition::ShortAnswer(def) => {
                LeafQuestion::ShortAnswer(SaQuestion::new(def, instance_id, weight)?)
            }
        })
    }

    fn inner(&self) -> &dyn Gradable {
        match self {
            LeafQuestion::MultipleChoice(q) => q,
            LeafQuestion::ShortAnswer(q) => q,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Gradable {
        match self {
            LeafQuestion::MultipleChoice(q) => q,
            LeafQuestion::ShortAnswer(q) => q,
        }
    }
}

impl Gradable for LeafQuestion {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn instance_id(&self) -> &str {
        self.inner().instance_id()
    }

    fn kind(&self) -> QuestionKind {
        self.inner().kind()
    }

    fn weight(&self) -> f64 {
        self.inner().weight()
    }

    fn grade(&self) -> Grade {
        self.inner().grade()
    }

    fn student_answer(&self) -> StudentAnswer {
        self.inner().student_answer()
    }

    fn set_student_answer(&mut self, answer: Option<&StudentAnswer>) -> bool {
        self.inner_mut().set_student_answer(answer)
    }

    fn make_read_only(&mut self) {
        self.inner_mut().make_read_only()
    }
}

#[derive(Debug, Clone)]
pub enum Question {
    MultipleChoice(McQuestion),
    ShortAnswer(SaQuestion),
    Group(QuestionGroup),
}

impl Question {
    /// Builds a runtime question, drawing instance ids from `next_id`.
    pub fn build(
        definition: &QuestionDefinition,
        next_id: &mut dyn FnMut() -> String,
        random: &mut dyn RandomSource,
    ) -> CourseResult<Self> {
        Ok(match definition {
            QuestionDefinition::MultipleChoice(def) => {
                let weight = definition::parse_weight(&def.id, def.weight.as_ref())?;
                Question::MultipleChoice(McQuestion::new(def, next_id(), weight, random)?)
            }
            QuestionDefinition::ShortAnswer(def) => {
                let weight = definition::parse_weight(&def.id, def.weight.as_ref())?;
                Question::ShortAnswer(SaQuestion::new(def, next_id(), weight)?)
            }
            QuestionDefinition::QuestionGroup(def) => {
                Question::Group(QuestionGroup::new(def, next_id, random)?)
            }
        })
    }

    /// Ids of this question and, for groups, of every child.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Question::Group(group) => std::iter::once(group.id())
                .chain(group.children().iter().map(|c| c.id()))
                .collect(),
            _ => vec![self.id()],
        }
    }

    pub fn multiple_choice_mut(&mut self, id: &str) -> Option<&mut McQuestion> {
        match self {
            Question::MultipleChoice(q) if q.id() == id => Some(q),
            Question::Group(group) => group.children_mut().iter_mut().find_map(|c| match c {
                LeafQuestion::MultipleChoice(q) if q.id() == id => Some(q),
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn short_answer_mut(&mut self, id: &str) -> Option<&mut SaQuestion> {
        match self {
            Question::ShortAnswer(q) if q.id() == id => Some(q),
            Question::Group(group) => group.children_mut().iter_mut().find_map(|c| match c {
                LeafQuestion::ShortAnswer(q) if q.id() == id => Some(q),
                _ => None,
            }),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Gradable {
        match self {
            Question::MultipleChoice(q) => q,
            Question::ShortAnswer(q) => q,
            Question::Group(q) => q,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Gradable {
        match self {
            Question::MultipleChoice(q) => q,
            Question::ShortAnswer(q) => q,
            Question::Group(q) => q,
        }
    }
}

impl Gradable for Question {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn instance_id(&self) -> &str {
        self.inner().instance_id()
    }

    fn kind(&self) -> QuestionKind {
        self.inner().kind()
    }

    fn weight(&self) -> f64 {
        self.inner().weight()
    }

    fn grade(&self) -> Grade {
        self.inner().grade()
    }

    fn student_answer(&self) -> StudentAnswer {
        self.inner().student_answer()
    }

    fn set_student_answer(&mut self, answer: Option<&StudentAnswer>) -> bool {
        self.inner_mut().set_student_answer(answer)
    }

    fn make_read_only(&mut self) {
        self.inner_mut().make_read_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_thresholds_tolerate_rounding() {
        assert_eq!(Verdict::from_score(0.995), Verdict::Correct);
        assert_eq!(Verdict::from_score(1.0), Verdict::Correct);
        assert_eq!(Verdict::from_score(0.99), Verdict::PartiallyCorrect);
        assert_eq!(Verdict::from_score(0.5), Verdict::PartiallyCorrect);
        assert_eq!(Verdict::from_score(0.01), Verdict::PartiallyCorrect);
        assert_eq!(Verdict::from_score(0.005), Verdict::Incorrect);
        assert_eq!(Verdict::from_score(0.0), Verdict::Incorrect);
    }

    #[test]
    fn reported_scores_round_to_two_places() {
        assert_eq!(round_to_hundredths(1.0 / 6.0), 0.17);
        assert_eq!(round_to_hundredths(0.6), 0.6);
        assert_eq!(round_to_hundredths(2.0 / 3.0), 0.67);
    }

    #[test]
    fn clamp_bounds_scores() {
        assert_eq!(clamp_score(-6.0), 0.0);
        assert_eq!(clamp_score(5.0), 1.0);
        assert_eq!(clamp_score(0.25), 0.25);
    }

    #[test]
    fn kind_serializes_as_type_tag() {
        let tags = serde_json::to_string(&vec![
            QuestionKind::McQuestion,
            QuestionKind::SaQuestion,
            QuestionKind::QuestionGroup,
        ])
        .unwrap();
        assert_eq!(tags, r#"["McQuestion","SaQuestion","QuestionGroup"]"#);
    }
}
