use std::collections::BTreeMap;

use course_grader::error::Error;
use course_grader::grading::{QuestionKind, StudentAnswer};
use course_grader::state::{self, CourseStateService, PageStatus};
use pretty_assertions::assert_eq;
use serde_json::json;

fn write_course(dir: &tempfile::TempDir) {
    let config = json!({
        "title": "Fractions",
        "assessment_type": "quiz1",
        "questions": [
            { "type": "multiple_choice", "id": "half", "permute_choices": true,
              "choices": [{ "score": 1, "text": "1/2" }, { "score": 0, "text": "1/3" }] },
            { "type": "short_answer", "id": "third",
              "graders": [{ "matcher": "numeric", "response": "0.5", "score": 1 }] },
            { "type": "question_group", "id": "group",
              "questions": [
                  { "type": "multiple_choice", "id": "group-a", "choices": [{ "score": 1 }, { "score": 0 }] },
                  { "type": "short_answer", "id": "group-b",
                    "graders": [{ "matcher": "regex", "response": "/^yes$/i", "score": 1 }] }
              ],
              "weights": { "group-a": 1, "group-b": 5 } }
        ]
    });
    std::fs::write(dir.path().join("course.config"), config.to_string()).unwrap();
}

fn start(dir: &tempfile::TempDir) -> CourseStateService {
    let (root, config) = state::get_config(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(config.question_count(), 3);
    // always drawing 0 keeps the authored order
    let page = config.build_page(&mut || 0.0_f64).unwrap();
    state::create_course_state(root, page)
}

#[tokio::test]
async fn grades_and_submits_a_page() {
    let dir = tempfile::tempdir().unwrap();
    write_course(&dir);
    let state = start(&dir);

    assert_eq!(state.root().await.unwrap(), std::fs::canonicalize(dir.path()).unwrap());
    assert_eq!(state.title().await.unwrap(), "Fractions");
    let kinds: Vec<QuestionKind> = state.questions().await.unwrap().iter().map(|q| q.kind).collect();
    assert_eq!(kinds, vec![QuestionKind::McQuestion, QuestionKind::SaQuestion, QuestionKind::QuestionGroup]);

    state.select("half", vec![0]).await.unwrap();
    state.respond("third", "0.50").await.unwrap();
    state.select("group-a", vec![0]).await.unwrap();

    let group = state.grade_question("group").await.unwrap();
    assert_eq!(group.grade.score, 1.0 / 6.0);
    assert_eq!(group.grade.audit_record(&group.instance_id).score, 0.17);

    let report = state.grade_lesson().await.unwrap();
    assert_eq!(report.questions.len(), 3);
    assert_eq!(report.reported_percentage(), 37.5);

    let submission = state.submit("token-1").await.unwrap();
    assert_eq!(submission.assessment_type, "quiz1");
    assert_eq!(submission.score, 37.5);
    assert_eq!(submission.xsrf_token, "token-1");
    assert_eq!(state.status().await.unwrap(), PageStatus::Submitted { score: 37.5 });

    assert!(matches!(state.select("half", vec![1]).await, Err(Error::ReadOnly(_))));
    assert!(matches!(state.submit("token-2").await, Err(Error::AlreadySubmitted)));
}

#[tokio::test]
async fn answers_round_trip_through_the_service() {
    let dir = tempfile::tempdir().unwrap();
    write_course(&dir);
    let state = start(&dir);

    let answers: BTreeMap<String, serde_json::Value> = serde_json::from_value(json!({
        "half": { "responses": [false, true], "permutation": [1, 0] },
        "third": "0.5",
        "group": { "group-a": 42, "group-b": { "response": "YES" } }
    }))
    .unwrap();
    let applied = state.restore(answers).await.unwrap();
    assert_eq!(applied, vec!["half".to_string(), "group".to_string()]);

    let saved = state.answers().await.unwrap();
    assert_eq!(
        saved["half"],
        StudentAnswer::Permuted { responses: vec![false, true], permutation: vec![1, 0] }
    );
    assert_eq!(saved["third"], StudentAnswer::Text { response: String::new() });

    let half = state.grade_question("half").await.unwrap();
    assert_eq!(half.grade.score, 1.0);
    let group = state.grade_question("group").await.unwrap();
    assert_eq!(group.grade.individual_scores, Some(vec![0.0, 1.0]));
}

#[tokio::test]
async fn unknown_questions_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_course(&dir);
    let state = start(&dir);

    assert!(state.question("missing").await.unwrap().is_none());
    assert!(matches!(state.grade_question("missing").await, Err(Error::UnknownQuestion(_))));
    assert!(matches!(state.respond("half", "x").await, Err(Error::UnknownQuestion(_))));
    assert!(matches!(state.select("half", vec![5]).await, Err(Error::ChoiceOutOfRange { .. })));
}

#[tokio::test]
async fn a_bad_position_selects_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_course(&dir);
    let state = start(&dir);

    assert!(matches!(state.select("group-a", vec![0, 9]).await, Err(Error::ChoiceOutOfRange { .. })));
    let saved = state.answers().await.unwrap();
    match &saved["group"] {
        StudentAnswer::Group(children) => {
            assert_eq!(children["group-a"], StudentAnswer::Choices(vec![false, false]))
        }
        other => panic!("expected group answer, got {:?}", other),
    }
}
