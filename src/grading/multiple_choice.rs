use std::collections::BTreeSet;

use crate::error::{CourseResult, Error};

use super::random::is_permutation;
use super::{
    clamp_score, identity_permutation, random_permutation, Feedback, Gradable, Grade, McDefinition,
    QuestionKind, RandomSource, StudentAnswer, Verdict,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    score: f64,
    text: Option<String>,
    feedback: Option<String>,
}

impl Choice {
    pub fn new(score: f64, text: Option<String>, feedback: Option<String>) -> Self {
        Choice { score, text, feedback }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    fn is_correct(&self) -> bool {
        self.score > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct McQuestion {
    id: String,
    instance_id: String,
    weight: f64,
    choices: Vec<Choice>,
    multiple_selections: bool,
    permute_choices: bool,
    all_or_nothing_grading: bool,
    show_answer_when_incorrect: bool,
    /// Choice index shown at each display position.
    permutation: Vec<usize>,
    /// Checked state of each display position.
    selected: Vec<bool>,
    read_only: bool,
}

impl McQuestion {
    pub fn new(
        definition: &McDefinition,
        instance_id: String,
        weight: f64,
        random: &mut dyn RandomSource,
    ) -> CourseResult<Self> {
        if definition.choices.is_empty() {
            return Err(Error::NoChoices(definition.id.clone()));
        }
        let choices = definition
            .choices
            .iter()
            .map(|c| {
                Ok(Choice::new(c.score.parse(&definition.id)?, c.text.clone(), c.feedback.clone()))
            })
            .collect::<CourseResult<Vec<_>>>()?;
        let count = choices.len();
        let permutation = if definition.permute_choices {
            random_permutation(count, random)
        } else {
            identity_permutation(count)
        };
        Ok(McQuestion {
            id: definition.id.clone(),
            instance_id,
            weight,
            choices,
            multiple_selections: definition.multiple_selections,
            permute_choices: definition.permute_choices,
            all_or_nothing_grading: definition.all_or_nothing_grading,
            show_answer_when_incorrect: definition.show_answer_when_incorrect,
            permutation,
            selected: vec![false; count],
            read_only: false,
        })
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn multiple_selections(&self) -> bool {
        self.multiple_selections
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Choices in display order with their checked state.
    pub fn display_choices(&self) -> impl Iterator<Item = (usize, &Choice, bool)> {
        let choices = &self.choices;
        self.permutation
            .iter()
            .zip(self.selected.iter())
            .enumerate()
            .map(move |(position, (&index, &checked))| (position, &choices[index], checked))
    }

    pub fn select(&mut self, position: usize) -> CourseResult<()> {
        self.check_position(position)?;
        if !self.multiple_selections {
            self.selected.iter_mut().for_each(|s| *s = false);
        }
        self.selected[position] = true;
        Ok(())
    }

    /// Selects every position, or none of them when one is invalid.
    pub fn select_all(&mut self, positions: &[usize]) -> CourseResult<()> {
        positions.iter().try_for_each(|&position| self.check_position(position))?;
        positions.iter().try_for_each(|&position| self.select(position))
    }

    pub fn deselect(&mut self, position: usize) -> CourseResult<()> {
        self.check_position(position)?;
        self.selected[position] = false;
        Ok(())
    }

    pub fn clear_selection(&mut self) -> CourseResult<()> {
        if self.read_only {
            return Err(Error::ReadOnly(self.id.clone()));
        }
        self.selected.iter_mut().for_each(|s| *s = false);
        Ok(())
    }

    fn check_position(&self, position: usize) -> CourseResult<()> {
        if self.read_only {
            Err(Error::ReadOnly(self.id.clone()))
        } else if position >= self.selected.len() {
            Err(Error::ChoiceOutOfRange { question: self.id.clone(), position })
        } else {
            Ok(())
        }
    }

    /// Selected choice indices, in display order.
    fn selected_choices(&self) -> Vec<usize> {
        self.permutation
            .iter()
            .zip(self.selected.iter())
            .filter(|(_, checked)| **checked)
            .map(|(&index, _)| index)
            .collect()
    }

    fn correct_answers(&self) -> Vec<String> {
        self.choices
            .iter()
            .filter(|c| c.is_correct())
            .filter_map(|c| c.text.clone())
            .collect()
    }
}

impl Gradable for McQuestion {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn kind(&self) -> QuestionKind {
        QuestionKind::McQuestion
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn grade(&self) -> Grade {
        let selected = self.selected_choices();
        let messages = selected
            .iter()
            .filter_map(|&i| self.choices[i].feedback.clone())
            .collect();

        let score = if self.all_or_nothing_grading {
            let expected: BTreeSet<usize> = (0..self.choices.len())
                .filter(|&i| self.choices[i].is_correct())
                .collect();
            let chosen: BTreeSet<usize> = selected.iter().copied().collect();
            if chosen == expected { 1.0 } else { 0.0 }
        } else {
            clamp_score(selected.iter().map(|&i| self.choices[i].score).sum())
        };

        let mut feedback = Feedback { messages, ..Feedback::default() };
        if self.show_answer_when_incorrect {
            feedback.verdict = Some(Verdict::from_score(score));
            if score < 1.0 {
                feedback.correct_answers = self.correct_answers();
            }
        }
        Grade::leaf(self.student_answer(), score, feedback, QuestionKind::McQuestion)
    }

    fn student_answer(&self) -> StudentAnswer {
        if self.permute_choices {
            StudentAnswer::Permuted {
                responses: self.selected.clone(),
                permutation: self.permutation.clone(),
            }
        } else {
            StudentAnswer::Choices(self.selected.clone())
        }
    }

    fn set_student_answer(&mut self, answer: Option<&StudentAnswer>) -> bool {
        let count = self.choices.len();
        let (responses, permutation) = match answer.and_then(StudentAnswer::as_choices) {
            Some(parts) => parts,
            None => return false,
        };
        if responses.len() != count || !is_permutation(&permutation, count) {
            return false;
        }

        let mut by_choice = vec![false; count];
        for (&index, &checked) in permutation.iter().zip(responses) {
            by_choice[index] = checked;
        }
        if self.permute_choices {
            self.permutation = permutation;
        }
        self.selected = self.permutation.iter().map(|&i| by_choice[i]).collect();
        true
    }

    fn make_read_only(&mut self) {
        self.read_only = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{ChoiceDefinition, GradeFeedback, ScoreValue};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn definition(scores: &[f64]) -> McDefinition {
        McDefinition {
            id: "mc".into(),
            weight: None,
            choices: scores
                .iter()
                .enumerate()
                .map(|(i, &s)| ChoiceDefinition {
                    score: ScoreValue::Number(s),
                    text: Some(format!("choice {}", i)),
                    feedback: Some(format!("feedback {}", i)),
                })
                .collect(),
            multiple_selections: true,
            permute_choices: false,
            all_or_nothing_grading: false,
            show_answer_when_incorrect: false,
        }
    }

    fn build(definition: &McDefinition) -> McQuestion {
        McQuestion::new(definition, "q0".into(), 1.0, &mut || 0.9_f64).unwrap()
    }

    fn messages(grade: &Grade) -> Vec<String> {
        match &grade.feedback {
            GradeFeedback::Single(feedback) => feedback.messages.clone(),
            other => panic!("unexpected feedback {:?}", other),
        }
    }

    #[test]
    fn invalid_positions_leave_the_selection_alone() {
        let mut q = build(&definition(&[1.0, 0.0]));
        assert!(matches!(
            q.select_all(&[0, 9]),
            Err(Error::ChoiceOutOfRange { position: 9, .. })
        ));
        assert_eq!(q.student_answer(), StudentAnswer::Choices(vec![false, false]));

        q.select_all(&[0, 1]).unwrap();
        assert_eq!(q.student_answer(), StudentAnswer::Choices(vec![true, true]));
    }

    #[test]
    fn negative_sums_clamp_to_zero() {
        let mut q = build(&definition(&[-1.0, -5.0]));
        q.select(0).unwrap();
        q.select(1).unwrap();
        assert_eq!(q.grade().score, 0.0);
    }

    #[test]
    fn large_scores_clamp_to_one() {
        let mut q = build(&definition(&[5.0, 0.0]));
        q.select(0).unwrap();
        assert_eq!(q.grade().score, 1.0);
    }

    #[test]
    fn partial_credit_sums_selected_scores() {
        let mut q = build(&definition(&[0.5, 0.25, -0.5]));
        q.select(0).unwrap();
        q.select(1).unwrap();
        let grade = q.grade();
        assert_eq!(grade.score, 0.75);
        assert_eq!(grade.kind, QuestionKind::McQuestion);
        assert_eq!(messages(&grade), vec!["feedback 0".to_string(), "feedback 1".to_string()]);
    }

    #[test]
    fn feedback_follows_display_order() {
        let mut def = definition(&[1.0, 0.0, 0.0]);
        def.permute_choices = true;
        let mut q = build(&def);
        // 0.9 draws display the choices reversed
        q.select(0).unwrap();
        q.select(2).unwrap();
        assert_eq!(messages(&q.grade()), vec!["feedback 2".to_string(), "feedback 0".to_string()]);
    }

    #[test]
    fn single_selection_replaces_previous_choice() {
        let mut def = definition(&[1.0, 0.0]);
        def.multiple_selections = false;
        let mut q = build(&def);
        q.select(0).unwrap();
        q.select(1).unwrap();
        assert_eq!(q.student_answer(), StudentAnswer::Choices(vec![false, true]));
        assert_eq!(q.grade().score, 0.0);
    }

    #[test]
    fn all_or_nothing_requires_the_exact_correct_set() {
        let mut def = definition(&[0.5, 0.5, 0.0]);
        def.all_or_nothing_grading = true;
        let mut q = build(&def);

        q.select(0).unwrap();
        assert_eq!(q.grade().score, 0.0);
        q.select(1).unwrap();
        assert_eq!(q.grade().score, 1.0);
        q.select(2).unwrap();
        assert_eq!(q.grade().score, 0.0);
        q.clear_selection().unwrap();
        assert_eq!(q.grade().score, 0.0);
    }

    #[test]
    fn incorrect_answers_show_the_correct_choices() {
        let mut def = definition(&[1.0, 0.0]);
        def.show_answer_when_incorrect = true;
        let mut q = build(&def);
        q.select(1).unwrap();
        match q.grade().feedback {
            GradeFeedback::Single(feedback) => {
                assert_eq!(feedback.verdict, Some(Verdict::Incorrect));
                assert_eq!(feedback.correct_answers, vec!["choice 0".to_string()]);
            }
            other => panic!("unexpected feedback {:?}", other),
        }

        q.select(0).unwrap();
        q.deselect(1).unwrap();
        match q.grade().feedback {
            GradeFeedback::Single(feedback) => {
                assert_eq!(feedback.verdict, Some(Verdict::Correct));
                assert!(feedback.correct_answers.is_empty());
            }
            other => panic!("unexpected feedback {:?}", other),
        }
    }

    #[test]
    fn partially_correct_heading() {
        let mut def = definition(&[0.5, 0.5]);
        def.show_answer_when_incorrect = true;
        let mut q = build(&def);
        q.select(0).unwrap();
        match q.grade().feedback {
            GradeFeedback::Single(feedback) => {
                assert_eq!(feedback.verdict, Some(Verdict::PartiallyCorrect));
                assert_eq!(feedback.correct_answers.len(), 2);
            }
            other => panic!("unexpected feedback {:?}", other),
        }
    }

    #[test]
    fn permuted_answer_round_trips() {
        let mut def = definition(&[1.0, 0.0]);
        def.permute_choices = true;
        let mut q = McQuestion::new(&def, "q0".into(), 1.0, &mut || 0.0_f64).unwrap();
        let answer = StudentAnswer::Permuted { responses: vec![false, true], permutation: vec![1, 0] };
        assert!(q.set_student_answer(Some(&answer)));
        assert_eq!(q.student_answer(), answer);
        // display position 1 shows choice 0
        assert_eq!(q.grade().score, 1.0);
    }

    #[test]
    fn bare_array_is_coerced_to_identity_permutation() {
        let mut def = definition(&[1.0, 0.0]);
        def.permute_choices = true;
        let mut q = build(&def);
        assert!(q.set_student_answer(Some(&StudentAnswer::Choices(vec![true, false]))));
        assert_eq!(
            q.student_answer(),
            StudentAnswer::Permuted { responses: vec![true, false], permutation: vec![0, 1] }
        );
    }

    #[test]
    fn permuted_answer_is_remapped_when_not_permuting() {
        let mut q = build(&definition(&[1.0, 0.0, 0.0]));
        let answer = StudentAnswer::Permuted {
            responses: vec![true, false, false],
            permutation: vec![2, 0, 1],
        };
        assert!(q.set_student_answer(Some(&answer)));
        assert_eq!(q.student_answer(), StudentAnswer::Choices(vec![false, false, true]));
    }

    #[test]
    fn incompatible_answers_are_ignored() {
        let mut q = build(&definition(&[1.0, 0.0]));
        q.select(0).unwrap();
        let before = q.student_answer();
        assert!(!q.set_student_answer(None));
        assert!(!q.set_student_answer(Some(&StudentAnswer::Text { response: "x".into() })));
        assert!(!q.set_student_answer(Some(&StudentAnswer::Choices(vec![true]))));
        assert!(!q.set_student_answer(Some(&StudentAnswer::Permuted {
            responses: vec![true, false],
            permutation: vec![0, 0],
        })));
        assert_eq!(q.student_answer(), before);
    }

    #[test]
    fn read_only_blocks_selection() {
        let mut q = build(&definition(&[1.0, 0.0]));
        q.make_read_only();
        assert!(matches!(q.select(0), Err(Error::ReadOnly(_))));
        assert!(q.set_student_answer(Some(&StudentAnswer::Choices(vec![true, false]))));
        assert_eq!(q.grade().score, 1.0);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut q = build(&definition(&[1.0]));
        assert!(matches!(q.select(3), Err(Error::ChoiceOutOfRange { position: 3, .. })));
    }

    #[test]
    fn malformed_scores_fail_construction() {
        let mut def = definition(&[1.0]);
        def.choices[0].score = ScoreValue::Text("one".into());
        assert!(matches!(
            McQuestion::new(&def, "q0".into(), 1.0, &mut || 0.0_f64),
            Err(Error::InvalidScore { .. })
        ));
        def.choices.clear();
        assert!(matches!(
            McQuestion::new(&def, "q0".into(), 1.0, &mut || 0.0_f64),
            Err(Error::NoChoices(_))
        ));
    }

    proptest! {
        #[test]
        fn grade_stays_in_unit_interval(
            scores in prop::collection::vec(-10.0f64..10.0, 1..8),
            picks in prop::collection::vec(any::<bool>(), 8),
        ) {
            let mut q = build(&definition(&scores));
            for (position, pick) in picks.iter().take(scores.len()).enumerate() {
                if *pick {
                    q.select(position).unwrap();
                }
            }
            let score = q.grade().score;
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
