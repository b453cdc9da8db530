use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A saved student answer. The shape depends on the question type and
/// round-trips through `Gradable::student_answer` / `set_student_answer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentAnswer {
    Permuted {
        responses: Vec<bool>,
        permutation: Vec<usize>,
    },
    Choices(Vec<bool>),
    Text {
        response: String,
    },
    Group(BTreeMap<String, StudentAnswer>),
}

impl StudentAnswer {
    /// Reads an answer out of arbitrary JSON. Unknown shapes yield `None`.
    /// An object that is no known shape is read as a group answer keeping
    /// only the children that decode.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        if let Ok(answer) = serde_json::from_value(value.clone()) {
            return Some(answer);
        }
        value.as_object().map(|children| {
            StudentAnswer::Group(
                children
                    .iter()
                    .filter_map(|(id, child)| Some((id.clone(), StudentAnswer::from_json(child)?)))
                    .collect(),
            )
        })
    }

    /// Splits a choice answer into responses and the permutation they were
    /// recorded under. Bare arrays were recorded unpermuted.
    pub(crate) fn as_choices(&self) -> Option<(&[bool], Vec<usize>)> {
        match self {
            StudentAnswer::Choices(responses) => {
                Some((responses.as_slice(), super::identity_permutation(responses.len())))
            }
            StudentAnswer::Permuted { responses, permutation } => {
                Some((responses.as_slice(), permutation.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shapes_are_recognised_from_json() {
        assert_eq!(
            StudentAnswer::from_json(&json!([true, false])),
            Some(StudentAnswer::Choices(vec![true, false]))
        );
        assert_eq!(
            StudentAnswer::from_json(&json!({"responses": [false, true], "permutation": [1, 0]})),
            Some(StudentAnswer::Permuted { responses: vec![false, true], permutation: vec![1, 0] })
        );
        assert_eq!(
            StudentAnswer::from_json(&json!({"response": "Paris"})),
            Some(StudentAnswer::Text { response: "Paris".into() })
        );
        let group = StudentAnswer::from_json(&json!({"a": [true], "b": {"response": "x"}})).unwrap();
        match group {
            StudentAnswer::Group(children) => assert_eq!(children.len(), 2),
            other => panic!("expected group answer, got {:?}", other),
        }
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        assert_eq!(StudentAnswer::from_json(&json!(42)), None);
        assert_eq!(StudentAnswer::from_json(&json!("Paris")), None);
        assert_eq!(StudentAnswer::from_json(&json!(null)), None);
    }

    #[test]
    fn group_answers_keep_children_that_decode() {
        let answer = StudentAnswer::from_json(&json!({"more-1": 42, "more-2": {"response": "3"}}));
        assert_eq!(
            answer,
            Some(StudentAnswer::Group(BTreeMap::from([(
                "more-2".to_string(),
                StudentAnswer::Text { response: "3".into() }
            )])))
        );
    }

    #[test]
    fn answers_serialize_without_tags() {
        let answer = StudentAnswer::Permuted { responses: vec![true], permutation: vec![0] };
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            json!({"responses": [true], "permutation": [0]})
        );
    }
}
