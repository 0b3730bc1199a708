//! Humdrum spine tracking, null-token resolution and rhythm analysis.
//!
//! A Humdrum file is a grid of TAB-separated columns (spines) whose shape
//! changes as the file goes on: spines split, join, swap places, appear and
//! end. This crate follows that topology line by line, assigns every field a
//! track and a sub-spine label, and links every null token (`.`) back to the
//! data token it continues.
//!
//! # Example
//!
//! ```
//! use humdrum::{parse, Coord, NullRef};
//!
//! let file = parse("**kern\t**kern\n4c\t4e\n.\t4f\n*-\t*-\n").unwrap();
//!
//! assert_eq!(file.max_track(), 2);
//! assert_eq!(
//!     file.line(2).unwrap().fields[0].null_ref,
//!     NullRef::Resolved(Coord::new(1, 0))
//! );
//! ```

pub mod batch;
pub mod classify;
pub mod error;
pub mod feedback;
pub mod file;
pub mod nulls;
pub mod rhythm;
pub mod spine;

use std::fs;
use std::path::Path;

pub use classify::{classify_line, LineKind, Manipulator};
pub use error::{HumdrumError, Result, StructuralError};
pub use feedback::{Analysis, Feedback, FeedbackLevel};
pub use file::{Coord, Field, HumdrumFile, Line, NullRef, Track, TrackId};
pub use rhythm::{analyze, RhythmAnalysis, RhythmOptions};
pub use spine::{ColumnMap, SpineTracker};

/// Track and resolve a whole document.
///
/// Fails on the first structural error; no partial result is returned.
pub fn parse(input: &str) -> Result<HumdrumFile> {
    let mut tracker = SpineTracker::new();
    for line in input.lines() {
        tracker.push_line(line)?;
    }
    let mut file = tracker.finish();
    nulls::resolve(&mut file);
    Ok(file)
}

/// Read and parse a file from disk. The file name is kept on the result.
pub fn load(path: impl AsRef<Path>) -> Result<HumdrumFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| HumdrumError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse(&text)?;
    Ok(file.with_name(path.display().to_string()))
}
