//! Analysis feedback (warnings, notes, suggestions).
//!
//! Structural problems abort a file through [`crate::HumdrumError`]. Everything
//! softer, such as an overfull measure or a token without a duration, is
//! collected here so the caller still gets a result.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    /// Timing past this point could not be computed exactly
    Error,
    Warning,
    Info,
}

impl fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedbackLevel::Error => "error",
            FeedbackLevel::Warning => "warning",
            FeedbackLevel::Info => "info",
        };
        f.write_str(name)
    }
}

/// A finding tied to a position in the file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub suggestion: Option<String>,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: line {}: {}", self.level, self.line, self.message)
    }
}

/// Gathers findings while a pass walks the file; the pass moves the cursor
/// with [`FeedbackCollector::set_position`] before reporting.
#[derive(Debug)]
pub struct FeedbackCollector {
    feedback: Vec<Feedback>,
    line: usize,
    column: usize,
}

impl Default for FeedbackCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackCollector {
    pub fn new() -> Self {
        FeedbackCollector {
            feedback: Vec::new(),
            line: 1,
            column: 1,
        }
    }

    pub fn set_position(&mut self, line: usize, column: usize) {
        self.line = line;
        self.column = column;
    }

    fn push(&mut self, level: FeedbackLevel, message: String, suggestion: Option<String>) {
        self.feedback.push(Feedback {
            level,
            message,
            line: self.line,
            column: self.column,
            suggestion,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(FeedbackLevel::Error, message.into(), None);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(FeedbackLevel::Warning, message.into(), None);
    }

    pub fn warning_with_suggestion(&mut self, message: impl Into<String>, suggestion: impl Into<String>) {
        self.push(FeedbackLevel::Warning, message.into(), Some(suggestion.into()));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(FeedbackLevel::Info, message.into(), None);
    }

    pub fn into_feedback(self) -> Vec<Feedback> {
        self.feedback
    }
}

/// An analysis value plus everything noticed while computing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis<T> {
    pub value: T,
    pub feedback: Vec<Feedback>,
}

impl<T> Analysis<T> {
    pub fn new(value: T, feedback: Vec<Feedback>) -> Self {
        Analysis { value, feedback }
    }

    pub fn at_level(&self, level: FeedbackLevel) -> impl Iterator<Item = &Feedback> {
        self.feedback.iter().filter(move |f| f.level == level)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Feedback> {
        self.at_level(FeedbackLevel::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Feedback> {
        self.at_level(FeedbackLevel::Error)
    }
}
