use std::{collections::BTreeMap, path::PathBuf};

use crate::error::{CourseResult, Error};
use crate::grading::{AuditRecord, Gradable, Question};
use crate::page::{AssessmentSubmission, GradedQuestion, LessonReport, Page};

use super::{service::CourseStateJob, PageStatus, QuestionSummary};

use serde_json::Value;
use tokio::sync::mpsc::Receiver;
use tokio::sync::oneshot::Sender as Return;
use tracing::{debug, info, warn};

pub(super) fn create_course_state(root: PathBuf, page: Page, job_receiver: Receiver<CourseStateJob>) {
    tokio::task::spawn(async move {
        let owner = CourseStateOwner {
            root,
            page,
            status: PageStatus::InProgress,
        };

        owner.handle_jobs(job_receiver).await
    });
}

fn reply<T>(sender: Return<T>, value: T) {
    if sender.send(value).is_err() {
        debug!("requester went away before the reply");
    }
}

fn log_audit(record: &AuditRecord) {
    match serde_json::to_string(record) {
        Ok(json) => info!(
            target: "course_grader::audit",
            instanceid = %record.instanceid,
            score = record.score,
            record = %json,
            "question graded"
        ),
        Err(e) => warn!("Could not encode audit record for {}: {}", record.instanceid, e),
    }
}

#[derive(Debug)]
struct CourseStateOwner {
    root: PathBuf,
    page: Page,
    status: PageStatus,
}

impl CourseStateOwner {
    async fn handle_jobs(mut self, mut job_receiver: Receiver<CourseStateJob>) {
        while let Some(job) = job_receiver.recv().await {
            match job {
                CourseStateJob::RootPath(sender)                 => reply(sender, self.root.clone()),
                CourseStateJob::Title(sender)                    => reply(sender, self.page.title().to_string()),
                CourseStateJob::Status(sender)                   => reply(sender, self.status),
                CourseStateJob::Questions(sender)                => reply(sender, self.questions()),
                CourseStateJob::Question(id, sender)             => reply(sender, self.question(&id)),
                CourseStateJob::Select(id, positions, sender)    => reply(sender, self.select(&id, &positions)),
                CourseStateJob::ClearSelection(id, sender)       => reply(sender, self.clear_selection(&id)),
                CourseStateJob::Respond(id, text, sender)        => reply(sender, self.respond(&id, text)),
                CourseStateJob::GradeQuestion(id, sender)        => reply(sender, self.grade_question(&id)),
                CourseStateJob::GradeLesson(sender)              => reply(sender, self.grade_lesson()),
                CourseStateJob::Submit(token, sender)            => reply(sender, self.submit(token)),
                CourseStateJob::Answers(sender)                  => reply(sender, self.page.answers()),
                CourseStateJob::Restore(answers, sender)         => reply(sender, self.restore(&answers)),
            }
        }
        debug!("course state for {:?} closed", self.root);
    }

    fn questions(&self) -> Vec<QuestionSummary> {
        self.page.questions().iter().map(QuestionSummary::from).collect()
    }

    fn question(&self, id: &str) -> Option<Question> {
        self.page.question(id).cloned()
    }

    fn select(&mut self, id: &str, positions: &[usize]) -> CourseResult<()> {
        self.page.multiple_choice_mut(id)?.select_all(positions)?;
        debug!(question = id, ?positions, "choices selected");
        Ok(())
    }

    fn clear_selection(&mut self, id: &str) -> CourseResult<()> {
        self.page.multiple_choice_mut(id)?.clear_selection()
    }

    fn respond(&mut self, id: &str, text: String) -> CourseResult<()> {
        self.page.short_answer_mut(id)?.set_response(text)
    }

    fn grade_question(&self, id: &str) -> CourseResult<GradedQuestion> {
        let question = self.page.question(id).ok_or_else(|| Error::UnknownQuestion(id.to_string()))?;
        let graded = GradedQuestion {
            id: question.id().to_string(),
            instance_id: question.instance_id().to_string(),
            weight: question.weight(),
            grade: question.grade(),
        };
        log_audit(&graded.grade.audit_record(&graded.instance_id));
        Ok(graded)
    }

    fn grade_lesson(&self) -> LessonReport {
        let report = self.page.grade_lesson();
        report.audit_records().iter().for_each(log_audit);
        info!(score = report.reported_percentage(), "lesson graded");
        report
    }

    fn submit(&mut self, xsrf_token: String) -> CourseResult<AssessmentSubmission> {
        if self.status.is_submitted() {
            return Err(Error::AlreadySubmitted);
        }
        let submission = self.page.submit(xsrf_token);
        self.page.make_read_only();
        self.status = PageStatus::Submitted { score: submission.score };
        info!(
            assessment = %submission.assessment_type,
            score = submission.score,
            "assessment submitted"
        );
        Ok(submission)
    }

    fn restore(&mut self, answers: &BTreeMap<String, Value>) -> Vec<String> {
        let applied = self.page.restore_answers(answers);
        if applied.len() < answers.len() {
            warn!(applied = applied.len(), given = answers.len(), "some answers were not restored");
        }
        applied
    }
}
