use std::collections::BTreeMap;

use crate::error::{CourseResult, Error};

use super::definition::parse_weight;
use super::{
    Gradable, Grade, GradeFeedback, GroupDefinition, LeafQuestion, QuestionKind, RandomSource,
    StudentAnswer, EPSILON,
};

/// Leaf questions graded together as a weighted average.
#[derive(Debug, Clone)]
pub struct QuestionGroup {
    id: String,
    instance_id: String,
    children: Vec<LeafQuestion>,
    /// Declared weight of each child, parallel to `children`.
    weights: Vec<f64>,
}

impl QuestionGroup {
    pub fn new(
        definition: &GroupDefinition,
        next_id: &mut dyn FnMut() -> String,
        random: &mut dyn RandomSource,
    ) -> CourseResult<Self> {
        if definition.questions.is_empty() {
            return Err(Error::EmptyGroup(definition.id.clone()));
        }
        let instance_id = next_id();
        let mut children = Vec::with_capacity(definition.questions.len());
        let mut weights = Vec::with_capacity(definition.questions.len());
        for child in &definition.questions {
            let weight = parse_weight(child.id(), definition.weights.get(child.id()))?;
            children.push(LeafQuestion::build(child, next_id(), weight, random)?);
            weights.push(weight);
        }
        Ok(QuestionGroup { id: definition.id.clone(), instance_id, children, weights })
    }

    pub fn children(&self) -> &[LeafQuestion] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [LeafQuestion] {
        &mut self.children
    }

    /// Sum of the declared child weights.
    pub fn total_points(&self) -> f64 {
        self.weights.iter().sum()
    }
}

impl Gradable for QuestionGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn kind(&self) -> QuestionKind {
        QuestionKind::QuestionGroup
    }

    fn weight(&self) -> f64 {
        self.total_points() + EPSILON
    }

    fn grade(&self) -> Grade {
        let mut score_total = 0.0;
        let mut weight_total = 0.0;
        let mut feedback = Vec::with_capacity(self.children.len());
        let mut individual_scores = Vec::with_capacity(self.children.len());
        let mut contained_types = Vec::with_capacity(self.children.len());

        for (child, &weight) in self.children.iter().zip(&self.weights) {
            let grade = child.grade();
            score_total += weight * grade.score;
            weight_total += weight;
            individual_scores.push(grade.score);
            contained_types.push(grade.kind);
            feedback.extend(match grade.feedback {
                GradeFeedback::Single(f) => vec![f],
                GradeFeedback::PerQuestion(fs) => fs,
            });
        }

        Grade {
            answer: self.student_answer(),
            score: if weight_total > 0.0 { score_total / weight_total } else { 0.0 },
            feedback: GradeFeedback::PerQuestion(feedback),
            kind: QuestionKind::QuestionGroup,
            individual_scores: Some(individual_scores),
            contained_types: Some(contained_types),
        }
    }

    fn student_answer(&self) -> StudentAnswer {
        StudentAnswer::Group(
            self.children
                .iter()
                .map(|c| (c.id().to_string(), c.student_answer()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    /// Applies every child answer that fits; the others are skipped.
    fn set_student_answer(&mut self, answer: Option<&StudentAnswer>) -> bool {
        let answers = match answer {
            Some(StudentAnswer::Group(answers)) => answers,
            _ => return false,
        };
        let mut applied = false;
        for child in &mut self.children {
            let id = child.id().to_string();
            applied |= child.set_student_answer(answers.get(&id));
        }
        applied
    }

    fn make_read_only(&mut self) {
        self.children.iter_mut().for_each(|c| c.make_read_only());
    }
}
