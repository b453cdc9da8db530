use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid score {value:?} in question {question}")]
    InvalidScore { question: String, value: String },
    #[error("Invalid weight {value} for question {question}")]
    InvalidWeight { question: String, value: f64 },
    #[error("Invalid regex {pattern:?} in question {question}: {source}")]
    InvalidRegex {
        question: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid numeric response {value:?} in question {question}")]
    InvalidNumber { question: String, value: String },
    #[error("Multiple choice question {0} has no choices")]
    NoChoices(String),
    #[error("Question group {0} has no questions")]
    EmptyGroup(String),
    #[error("Duplicate question id: {0}")]
    DuplicateId(String),
    #[error("Unknown question: {0}")]
    UnknownQuestion(String),
    #[error("Question {0} is read only")]
    ReadOnly(String),
    #[error("Choice {position} does not exist in question {question}")]
    ChoiceOutOfRange { question: String, position: usize },
    #[error("Assessment has already been submitted")]
    AlreadySubmitted,
    #[error("Course state is no longer running")]
    StateClosed,
}

pub type CourseResult<T> = Result<T, Error>;
