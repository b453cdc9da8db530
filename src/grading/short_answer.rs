use regex::{Regex, RegexBuilder};

use crate::error::{CourseResult, Error};

use super::{
    clamp_score, Feedback, Gradable, Grade, GraderDefinition, MatcherKind, QuestionKind,
    SaDefinition, StudentAnswer,
};

#[derive(Debug, Clone)]
pub enum Matcher {
    CaseInsensitive(String),
    Regex(Regex),
    /// Exact equality of the parsed values.
    Numeric(f64),
}

impl Matcher {
    pub fn new(question: &str, kind: MatcherKind, reference: &str) -> CourseResult<Self> {
        match kind {
            MatcherKind::CaseInsensitive => Ok(Matcher::CaseInsensitive(reference.to_lowercase())),
            MatcherKind::Regex => parse_regex(reference).map(Matcher::Regex).map_err(|source| {
                Error::InvalidRegex {
                    question: question.to_string(),
                    pattern: reference.to_string(),
                    source,
                }
            }),
            MatcherKind::Numeric => match parse_number(reference) {
                Some(n) => Ok(Matcher::Numeric(n)),
                None => Err(Error::InvalidNumber {
                    question: question.to_string(),
                    value: reference.to_string(),
                }),
            },
        }
    }

    pub fn matches(&self, response: &str) -> bool {
        match self {
            Matcher::CaseInsensitive(reference) => response.to_lowercase() == *reference,
            Matcher::Regex(regex) => regex.is_match(response),
            Matcher::Numeric(reference) => parse_number(response) == Some(*reference),
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Accepts a bare pattern or `/pattern/flags` with flags drawn from `gim`.
fn parse_regex(reference: &str) -> Result<Regex, regex::Error> {
    let delimited = reference
        .strip_prefix('/')
        .and_then(|rest| rest.rfind('/').map(|end| (&rest[..end], &rest[end + 1..])))
        .filter(|(_, flags)| flags.chars().all(|c| matches!(c, 'g' | 'i' | 'm')));
    match delimited {
        Some((pattern, flags)) => RegexBuilder::new(pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .build(),
        None => Regex::new(reference),
    }
}

#[derive(Debug, Clone)]
pub struct GraderRule {
    matcher: Matcher,
    score: f64,
    feedback: Option<String>,
}

impl GraderRule {
    pub fn new(question: &str, definition: &GraderDefinition) -> CourseResult<Self> {
        Ok(GraderRule {
            matcher: Matcher::new(question, definition.matcher, &definition.response)?,
            score: definition.score.parse(question)?,
            feedback: definition.feedback.clone(),
        })
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

#[derive(Debug, Clone)]
pub struct SaQuestion {
    id: String,
    instance_id: String,
    weight: f64,
    graders: Vec<GraderRule>,
    default_feedback: Option<String>,
    response: String,
    read_only: bool,
}

impl SaQuestion {
    pub fn new(definition: &SaDefinition, instance_id: String, weight: f64) -> CourseResult<Self> {
        let graders = definition
            .graders
            .iter()
            .map(|g| GraderRule::new(&definition.id, g))
            .collect::<CourseResult<Vec<_>>>()?;
        Ok(SaQuestion {
            id: definition.id.clone(),
            instance_id,
            weight,
            graders,
            default_feedback: definition.default_feedback.clone(),
            response: String::new(),
            read_only: false,
        })
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Records the text currently entered by the student.
    pub fn set_response(&mut self, response: impl Into<String>) -> CourseResult<()> {
        if self.read_only {
            return Err(Error::ReadOnly(self.id.clone()));
        }
        self.response = response.into();
        Ok(())
    }
}

impl Gradable for SaQuestion {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn kind(&self) -> QuestionKind {
        QuestionKind::SaQuestion
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn grade(&self) -> Grade {
        let (score, message) = match self.graders.iter().find(|g| g.matcher.matches(&self.response)) {
            Some(rule) => (clamp_score(rule.score), rule.feedback.clone()),
            None => (0.0, self.default_feedback.clone()),
        };
        let feedback = Feedback { messages: message.into_iter().collect(), ..Feedback::default() };
        Grade::leaf(self.student_answer(), score, feedback, QuestionKind::SaQuestion)
    }

    fn student_answer(&self) -> StudentAnswer {
        StudentAnswer::Text { response: self.response.clone() }
    }

    fn set_student_answer(&mut self, answer: Option<&StudentAnswer>) -> bool {
        match answer {
            Some(StudentAnswer::Text { response }) => {
                self.response = response.clone();
                true
            }
            _ => false,
        }
    }

    fn make_read_only(&mut self) {
        self.read_only = true;
    }
}
