use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Sender as Return};
use std::path::PathBuf;
use std::collections::BTreeMap;
use serde_json::Value;

use crate::error::{CourseResult, Error};
use crate::grading::{Question, StudentAnswer};
use crate::page::{AssessmentSubmission, GradedQuestion, LessonReport};

use super::{PageStatus, QuestionSummary};

pub enum CourseStateJob {
    RootPath(Return<PathBuf>),
    Title(Return<String>),
    Status(Return<PageStatus>),
    Questions(Return<Vec<QuestionSummary>>),
    Question(String, Return<Option<Question>>),
    Select(String, Vec<usize>, Return<CourseResult<()>>),
    ClearSelection(String, Return<CourseResult<()>>),
    Respond(String, String, Return<CourseResult<()>>),
    GradeQuestion(String, Return<CourseResult<GradedQuestion>>),
    GradeLesson(Return<LessonReport>),
    Submit(String, Return<CourseResult<AssessmentSubmission>>),
    Answers(Return<BTreeMap<String, StudentAnswer>>),
    Restore(BTreeMap<String, Value>, Return<Vec<String>>),
}

#[derive(Debug, Clone)]
pub struct CourseStateService {
    job_channel: Sender<CourseStateJob>,
}

impl CourseStateService {
    pub(super) fn new(job_channel: Sender<CourseStateJob>) -> Self {
        CourseStateService { job_channel }
    }

    async fn request<T>(&self, job: impl FnOnce(Return<T>) -> CourseStateJob) -> CourseResult<T> {
        let (send, recv) = oneshot::channel();
        self.job_channel.send(job(send)).await.map_err(|_| Error::StateClosed)?;
        recv.await.map_err(|_| Error::StateClosed)
    }

    pub async fn root(&self) -> CourseResult<PathBuf> {
        self.request(CourseStateJob::RootPath).await
    }

    pub async fn title(&self) -> CourseResult<String> {
        self.request(CourseStateJob::Title).await
    }

    pub async fn status(&self) -> CourseResult<PageStatus> {
        self.request(CourseStateJob::Status).await
    }

    pub async fn questions(&self) -> CourseResult<Vec<QuestionSummary>> {
        self.request(CourseStateJob::Questions).await
    }

    pub async fn question(&self, id: &str) -> CourseResult<Option<Question>> {
        self.request(|send| CourseStateJob::Question(id.to_string(), send)).await
    }

    /// Selects the choices at the given display positions.
    pub async fn select(&self, id: &str, positions: Vec<usize>) -> CourseResult<()> {
        self.request(|send| CourseStateJob::Select(id.to_string(), positions, send)).await?
    }

    pub async fn clear_selection(&self, id: &str) -> CourseResult<()> {
        self.request(|send| CourseStateJob::ClearSelection(id.to_string(), send)).await?
    }

    pub async fn respond(&self, id: &str, text: &str) -> CourseResult<()> {
        self.request(|send| CourseStateJob::Respond(id.to_string(), text.to_string(), send)).await?
    }

    pub async fn grade_question(&self, id: &str) -> CourseResult<GradedQuestion> {
        self.request(|send| CourseStateJob::GradeQuestion(id.to_string(), send)).await?
    }

    pub async fn grade_lesson(&self) -> CourseResult<LessonReport> {
        self.request(CourseStateJob::GradeLesson).await
    }

    /// Grades and locks the page. Only the first submission is accepted.
    pub async fn submit(&self, xsrf_token: &str) -> CourseResult<AssessmentSubmission> {
        self.request(|send| CourseStateJob::Submit(xsrf_token.to_string(), send)).await?
    }

    pub async fn answers(&self) -> CourseResult<BTreeMap<String, StudentAnswer>> {
        self.request(CourseStateJob::Answers).await
    }

    /// Restores answers as printed by `answers`. Entries of the wrong shape
    /// are skipped. Returns the ids of the questions whose answer was applied.
    pub async fn restore(&self, answers: BTreeMap<String, Value>) -> CourseResult<Vec<String>> {
        self.request(|send| CourseStateJob::Restore(answers, send)).await
    }
}
