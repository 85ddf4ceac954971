//! Quiz error types.
//!
//! These are the conditions a caller is expected to surface to the learner
//! as a notice rather than treat as fatal.

use thiserror::Error;

use crate::model::Category;

/// Errors raised by the quiz session controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// No quiz items could be built; reference data must be loaded first.
    #[error("no quiz items available, load the reference tables first")]
    NoItems,

    /// The current item's key has no record in the loaded tables.
    #[error("no ground truth for {category} {tag}")]
    NoGroundTruth { category: Category, tag: String },

    /// No session has been started.
    #[error("no quiz session is running")]
    NotStarted,

    /// The session cursor has passed the last item.
    #[error("the session has already finished")]
    SessionFinished,

    /// A category name could not be parsed.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

impl QuizError {
    /// Returns `true` if the session can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuizError::NoGroundTruth { .. })
    }
}
