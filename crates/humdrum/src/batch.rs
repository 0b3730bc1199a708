//! Processing many files at once.
//!
//! Each file is loaded independently. A structural error in one file is
//! recorded against that file and never affects the others.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use crate::error::{HumdrumError, Result};
use crate::file::HumdrumFile;

/// The result for one input.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<HumdrumFile>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&HumdrumError> {
        self.result.as_ref().err()
    }
}

/// Load every path, in order.
pub fn process<P: AsRef<Path>>(paths: &[P]) -> Vec<BatchOutcome> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            let _span = info_span!("file", path = %path.display()).entered();
            let result = crate::load(path);
            report(&result);
            BatchOutcome {
                path: path.to_path_buf(),
                result,
            }
        })
        .collect()
}

/// Parse in-memory documents, each under a display name.
pub fn process_texts<'a, I>(inputs: I) -> Vec<BatchOutcome>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    inputs
        .into_iter()
        .map(|(name, text)| {
            let _span = info_span!("file", path = name).entered();
            let result = crate::parse(text).map(|f| f.with_name(name));
            report(&result);
            BatchOutcome {
                path: PathBuf::from(name),
                result,
            }
        })
        .collect()
}

fn report(result: &Result<HumdrumFile>) {
    match result {
        Ok(file) => info!(lines = file.len(), tracks = file.max_track(), "parsed"),
        Err(e) => warn!(error = %e, "failed"),
    }
}

/// Counts over a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub ok: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let ok = outcomes.iter().filter(|o| o.is_ok()).count();
        BatchSummary {
            files: outcomes.len(),
            ok,
            failed: outcomes.len() - ok,
        }
    }

    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }
}
