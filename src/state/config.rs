use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::CourseResult;
use crate::grading::{QuestionDefinition, RandomSource};
use crate::page::{InstanceIds, Page};

fn default_instance_prefix() -> String {
    "q".into()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    title: String,
    #[serde(default)]
    assessment_type: Option<String>,
    #[serde(default = "default_instance_prefix")]
    instance_prefix: String,
    questions: Vec<QuestionDefinition>,
}

impl Config {
    pub fn from(root: &PathBuf) -> CourseResult<Self> {
        let path = root.join("course.config");
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Builds the page, validating every question definition.
    pub fn build_page(&self, random: &mut dyn RandomSource) -> CourseResult<Page> {
        let mut ids = InstanceIds::new(self.instance_prefix.clone());
        Page::new(self.title.clone(), self.assessment_type.clone(), &self.questions, &mut ids, random)
    }
}

pub fn get_config(root: &str) -> Result<(PathBuf, Config), String> {
    let path = root.to_string();
    std::fs::canonicalize(&path)
        .map_err(|_| format!("Could not find course root: {}\n", path))
        .and_then(|root| {
            Config::from(&root)
                .map_err(|e| format!("Could not import course.config file: {}\n", e))
                .map(|config| (root, config))
        })
}
