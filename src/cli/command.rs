use std::collections::BTreeMap;

use tabular::{Row, Table};

use course_grader::grading::{
    Feedback, Gradable, Grade, GradeFeedback, LeafQuestion, McQuestion, Question, SaQuestion,
};
use course_grader::normalize::{self, SelectionMode};
use course_grader::page::GradedQuestion;
use course_grader::state::{CourseStateService, PageStatus};

fn print_feedback(feedback: &Feedback, indent: &str) {
    if let Some(verdict) = feedback.verdict {
        println!("{}{}", indent, verdict);
    }
    for message in &feedback.messages {
        println!("{}{}", indent, message.replace('\n', " "));
    }
    if !feedback.correct_answers.is_empty() {
        println!("{}The correct answer: {}", indent, feedback.correct_answers.join(", "));
    }
}

fn print_grade(grade: &Grade) {
    match &grade.feedback {
        GradeFeedback::Single(feedback) => print_feedback(feedback, "\t"),
        GradeFeedback::PerQuestion(feedback) => {
            let scores = grade.individual_scores.as_deref().unwrap_or_default();
            for (i, f) in feedback.iter().enumerate() {
                match scores.get(i) {
                    Some(score) => println!("\t{}. score {:.2}", i + 1, score),
                    None => println!("\t{}.", i + 1),
                }
                print_feedback(f, "\t\t");
            }
        }
    }
}

fn multiple_choice_table(question: &McQuestion) -> Table {
    let mut table = Table::new("\t{:>}) [{:^}] {:<}");
    for (position, choice, checked) in question.display_choices() {
        table.add_row(Row::new()
            .with_cell(position)
            .with_cell(if checked { "x" } else { " " })
            .with_cell(choice.text().unwrap_or("")));
    }
    table
}

fn print_short_answer(question: &SaQuestion) {
    if question.response().is_empty() {
        println!("\tresponse: (none)");
    } else {
        println!("\tresponse: {}", question.response());
    }
}

fn print_leaf(question: &LeafQuestion) {
    match question {
        LeafQuestion::MultipleChoice(q) => println!("{}", multiple_choice_table(q)),
        LeafQuestion::ShortAnswer(q) => print_short_answer(q),
    }
}

pub async fn status(state: CourseStateService) {
    match (state.root().await, state.title().await, state.status().await) {
        (Ok(root), Ok(title), Ok(status)) => {
            println!("root: {:?}", root);
            println!("page: {}", title);
            match status {
                PageStatus::InProgress => println!("status: In progress"),
                PageStatus::Submitted{score} => println!("status: Submitted ({}%)", score),
            }
        },
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => println!("{}", e),
    }
}

pub async fn questions(state: CourseStateService) {
    let questions = match state.questions().await {
        Ok(questions) => questions,
        Err(e) => return println!("{}", e),
    };
    let mut table = Table::new("\t{:<}: {:<} {:<} weight {:>}");
    for q in questions {
        table.add_row(Row::new()
            .with_cell(q.id)
            .with_cell(q.instance_id)
            .with_cell(q.kind)
            .with_cell(format!("{:.2}", q.weight)));
    }
    println!("{}", table);
}

pub async fn show(state: CourseStateService, id: &str) {
    match state.question(id).await {
        Ok(Some(question)) => {
            println!("question: {} ({})", question.id(), question.kind());
            match &question {
                Question::MultipleChoice(q) => println!("{}", multiple_choice_table(q)),
                Question::ShortAnswer(q) => print_short_answer(q),
                Question::Group(group) => {
                    for child in group.children() {
                        println!("  {} ({})", child.id(), child.kind());
                        print_leaf(child);
                    }
                }
            }
        },
        Ok(None) => println!("Unknown question: {}", id),
        Err(e) => println!("{}", e),
    }
}

pub async fn select(state: CourseStateService, id: &str, positions: Vec<usize>) {
    if let Err(e) = state.select(id, positions).await {
        println!("{}", e);
    }
}

pub async fn clear(state: CourseStateService, id: &str) {
    if let Err(e) = state.clear_selection(id).await {
        println!("{}", e);
    }
}

pub async fn respond(state: CourseStateService, id: &str, text: &str) {
    if let Err(e) = state.respond(id, text.trim()).await {
        println!("{}", e);
    }
}

fn print_graded(graded: &GradedQuestion) {
    println!("{} ({}): {:.2}", graded.id, graded.grade.kind, graded.grade.score);
    print_grade(&graded.grade);
}

pub async fn grade(state: CourseStateService, id: Option<String>) {
    match id {
        Some(id) => match state.grade_question(&id).await {
            Ok(graded) => print_graded(&graded),
            Err(e) => println!("{}", e),
        },
        None => match state.grade_lesson().await {
            Ok(report) => {
                for graded in &report.questions {
                    print_graded(graded);
                }
                println!("Score: {}%", report.reported_percentage());
            },
            Err(e) => println!("{}", e),
        },
    }
}

pub async fn submit(state: CourseStateService, xsrf_token: &str) {
    let submission = match state.submit(xsrf_token).await {
        Ok(submission) => submission,
        Err(e) => return println!("Could not submit: {}", e),
    };
    match submission.form_fields() {
        Ok(fields) => {
            let mut table = Table::new("\t{:<} = {:<}");
            table.add_heading("Submitted form:");
            for (name, value) in fields {
                table.add_row(Row::new().with_cell(name).with_cell(value));
            }
            println!("{}", table);
        },
        Err(e) => println!("Could not encode submission: {}", e),
    }
}

pub async fn answers(state: CourseStateService) {
    match state.answers().await.map(|a| serde_json::to_string(&a)) {
        Ok(Ok(json)) => println!("{}", json),
        Ok(Err(e)) => println!("Could not encode answers: {}", e),
        Err(e) => println!("{}", e),
    }
}

pub async fn restore(state: CourseStateService, json: &str) {
    let answers: BTreeMap<String, serde_json::Value> = match serde_json::from_str(json) {
        Ok(answers) => answers,
        Err(e) => return println!("Could not read answers: {}", e),
    };
    match state.restore(answers).await {
        Ok(applied) => println!("Restored: {}", applied.join(", ")),
        Err(e) => println!("{}", e),
    }
}

pub fn normalize(mode: SelectionMode, scores: &[f64]) {
    let normal = normalize::normalize(scores, mode);
    println!("{:?}", normal);
    if !normalize::is_in_normal_form(scores, mode) {
        println!("Scores were not in normal form and have been altered.");
    }
}
