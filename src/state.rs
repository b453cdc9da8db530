mod config;
mod status;
mod owner;
mod service;

pub use config::{Config, get_config};
pub use status::{PageStatus, QuestionSummary};
pub use service::CourseStateService;

use std::path::PathBuf;
use tokio::sync::mpsc::channel;

use crate::page::Page;

/// Spawns the task owning `page` and returns a handle to it. Must be called
/// inside a tokio runtime.
pub fn create_course_state(root: PathBuf, page: Page) -> CourseStateService {
    let (job_sender, job_receiver) = channel(1000);

    owner::create_course_state(root, page, job_receiver);

    CourseStateService::new(job_sender)
}
