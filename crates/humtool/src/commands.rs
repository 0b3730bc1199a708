//! CLI command implementations

use anyhow::{Context, Result};
use humconf::{ConfigSources, HumConfig, NullReport, OutputFormat};
use humdrum::batch::{self, BatchSummary};
use humdrum::{HumdrumFile, RhythmOptions};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::render::{MeasuresReport, NullsReport, SpinesReport, TextReport, TracksReport};

#[derive(Serialize)]
struct FileReport<'a, T> {
    path: &'a str,
    #[serde(flatten)]
    report: &'a T,
}

/// Writes per-file reports as text right away, or gathers them into one
/// JSON array.
struct Emitter<'w, W: Write> {
    format: OutputFormat,
    headers: bool,
    out: &'w mut W,
    json: Vec<serde_json::Value>,
}

impl<W: Write> Emitter<'_, W> {
    fn emit<T: TextReport + Serialize>(&mut self, path: &str, report: &T) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if self.headers {
                    writeln!(self.out, "==> {} <==", path)?;
                }
                report.write_text(&mut *self.out)?;
            }
            OutputFormat::Json => {
                let value = serde_json::to_value(FileReport { path, report })
                    .context("Failed to serialize report")?;
                self.json.push(value);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *self.out, &self.json).context("Failed to write JSON")?;
            writeln!(self.out)?;
        }
        Ok(())
    }
}

/// Load every file, report on each one that parses, and print structural
/// errors to stderr. Returns false if any file failed.
fn for_each_file<W, F>(files: &[PathBuf], format: OutputFormat, out: &mut W, mut each: F) -> Result<bool>
where
    W: Write,
    F: FnMut(&mut Emitter<'_, W>, &str, &HumdrumFile) -> Result<()>,
{
    let outcomes = batch::process(files);
    let mut emitter = Emitter {
        format,
        headers: files.len() > 1,
        out,
        json: Vec::new(),
    };

    for outcome in &outcomes {
        let path = outcome.path.display().to_string();
        match &outcome.result {
            Ok(file) => each(&mut emitter, &path, file)?,
            Err(e) => eprintln!("{}: {}", path, e),
        }
    }
    emitter.finish()?;

    Ok(BatchSummary::from_outcomes(&outcomes).all_ok())
}

pub fn spines<W: Write>(files: &[PathBuf], config: &HumConfig, out: &mut W) -> Result<bool> {
    for_each_file(files, config.output.format, out, |emit, path, file| {
        emit.emit(path, &SpinesReport::new(file))
    })
}

pub fn tracks<W: Write>(files: &[PathBuf], config: &HumConfig, out: &mut W) -> Result<bool> {
    for_each_file(files, config.output.format, out, |emit, path, file| {
        emit.emit(
            path,
            &TracksReport {
                tracks: file.tracks(),
            },
        )
    })
}

pub fn nulls<W: Write>(files: &[PathBuf], config: &HumConfig, out: &mut W) -> Result<bool> {
    let unresolved_only = config.analysis.null_report == NullReport::Unresolved;
    for_each_file(files, config.output.format, out, |emit, path, file| {
        emit.emit(path, &NullsReport::new(file, unresolved_only))
    })
}

pub fn measures<W: Write>(files: &[PathBuf], config: &HumConfig, out: &mut W) -> Result<bool> {
    let options = RhythmOptions {
        rhythm_spines: config.analysis.rhythm_spines.clone(),
    };
    for_each_file(files, config.output.format, out, |emit, path, file| {
        let report = MeasuresReport::from(humdrum::analyze(file, &options));
        emit.emit(path, &report)
    })
}

#[derive(Serialize)]
struct CheckEntry {
    path: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
}

/// Validate each file. Failures go to stderr in text mode.
pub fn check<W: Write>(files: &[PathBuf], config: &HumConfig, out: &mut W) -> Result<bool> {
    let outcomes = batch::process(files);
    let mut entries = Vec::with_capacity(outcomes.len());

    for outcome in &outcomes {
        let path = outcome.path.display().to_string();
        let error = outcome.error();
        if config.output.format == OutputFormat::Text {
            match error {
                None => writeln!(out, "{}: ok", path)?,
                Some(e) => eprintln!("{}: {}", path, e),
            }
        }
        entries.push(CheckEntry {
            path,
            ok: error.is_none(),
            error: error.map(|e| e.to_string()),
            line: error.and_then(|e| e.as_structural()).map(|e| e.line()),
        });
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    match config.output.format {
        OutputFormat::Text => {
            if files.len() > 1 {
                writeln!(out, "{} ok, {} failed", summary.ok, summary.failed)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &entries).context("Failed to write JSON")?;
            writeln!(out)?;
        }
    }

    Ok(summary.all_ok())
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    config: &'a HumConfig,
    files: &'a [PathBuf],
    env_overrides: &'a [String],
}

pub fn show_config<W: Write>(config: &HumConfig, sources: &ConfigSources, out: &mut W) -> Result<()> {
    match config.output.format {
        OutputFormat::Text => {
            for path in &sources.files {
                writeln!(out, "# from {}", path.display())?;
            }
            for var in &sources.env_overrides {
                writeln!(out, "# env {}", var)?;
            }
            write!(out, "{}", config.to_toml())?;
        }
        OutputFormat::Json => {
            let report = ConfigReport {
                config,
                files: &sources.files,
                env_overrides: &sources.env_overrides,
            };
            serde_json::to_writer_pretty(&mut *out, &report).context("Failed to write JSON")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
