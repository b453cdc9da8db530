//! Grading engine for course pages: multiple choice, short answer and
//! weighted question groups, plus the score normalizer used by the
//! question editor.

pub mod error;
pub mod grading;
pub mod normalize;
pub mod page;
pub mod state;

pub use error::{CourseResult, Error};
