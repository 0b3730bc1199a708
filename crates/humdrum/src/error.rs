//! Errors raised while reading a Humdrum file.
//!
//! Structural errors are fatal for the file being processed: every line after
//! a bad manipulator depends on it, so there is nothing sensible to recover.

use std::path::PathBuf;
use thiserror::Error;

/// A malformed spine structure. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("line {line}: spine content before any exclusive interpretation")]
    MissingExclusiveInterpretation { line: usize },

    #[error("line {line}: expected an exclusive interpretation in column {column}, found {token:?}")]
    NotExclusive {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("line {line}: *v in column {column} has no adjacent *v to join with")]
    LoneJoin { line: usize, column: usize },

    #[error("line {line}: *x in column {column} has no adjacent *x to exchange with")]
    UnpairedExchange { line: usize, column: usize },

    #[error("line {line}: spine count mismatch, expected {expected} fields but found {found}")]
    SpineCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: whitespace-only line before the exclusive interpretation")]
    WhitespaceLine { line: usize },
}

impl StructuralError {
    /// 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            StructuralError::MissingExclusiveInterpretation { line }
            | StructuralError::NotExclusive { line, .. }
            | StructuralError::LoneJoin { line, .. }
            | StructuralError::UnpairedExchange { line, .. }
            | StructuralError::SpineCountMismatch { line, .. }
            | StructuralError::WhitespaceLine { line } => *line,
        }
    }
}

/// Anything that stops a file from being loaded.
#[derive(Debug, Error)]
pub enum HumdrumError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl HumdrumError {
    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            HumdrumError::Structural(e) => Some(e),
            HumdrumError::Io { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HumdrumError>;
