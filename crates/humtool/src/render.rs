//! Report shapes shared by the text and JSON outputs.
//!
//! Text output uses 1-based line and column numbers; JSON keeps the 0-based
//! coordinates of the library types.

use humdrum::rhythm::{Beats, MeasureInfo, RhythmAnalysis};
use humdrum::{Analysis, Coord, Feedback, HumdrumFile, Line, NullRef, Track};
use serde::Serialize;
use std::io::{self, Write};

/// A per-file report that can also be printed for humans.
pub trait TextReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

#[derive(Serialize)]
pub struct SpinesReport<'a> {
    pub lines: &'a [Line],
}

impl<'a> SpinesReport<'a> {
    pub fn new(file: &'a HumdrumFile) -> Self {
        SpinesReport {
            lines: file.lines(),
        }
    }
}

impl TextReport for SpinesReport<'_> {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        for line in self.lines {
            if line.fields.is_empty() {
                writeln!(out, "{}", line.text)?;
            } else {
                writeln!(out, "{}", line.labels().collect::<Vec<_>>().join("\t"))?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct TracksReport<'a> {
    pub tracks: &'a [Track],
}

impl TextReport for TracksReport<'_> {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "track\texclusive\tcreated\tterminated")?;
        for track in self.tracks {
            let exclusive = if track.exclusive.is_empty() {
                "-"
            } else {
                track.exclusive.as_str()
            };
            let terminated = track
                .terminated_line
                .map(|l| (l + 1).to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                track.id,
                exclusive,
                track.created_line + 1,
                terminated
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct NullEntry {
    pub at: Coord,
    pub resolution: NullRef,
}

#[derive(Serialize)]
pub struct NullsReport {
    pub nulls: Vec<NullEntry>,
}

impl NullsReport {
    pub fn new(file: &HumdrumFile, unresolved_only: bool) -> Self {
        let nulls = file
            .null_tokens()
            .filter(|(_, r)| !unresolved_only || *r == NullRef::Unresolved)
            .map(|(at, resolution)| NullEntry { at, resolution })
            .collect();
        NullsReport { nulls }
    }
}

fn one_based(at: Coord) -> String {
    format!("{}:{}", at.line + 1, at.column + 1)
}

impl TextReport for NullsReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        for entry in &self.nulls {
            match entry.resolution {
                NullRef::Resolved(target) => {
                    writeln!(out, "{} -> {}", one_based(entry.at), one_based(target))?
                }
                NullRef::Unresolved => writeln!(out, "{} unresolved", one_based(entry.at))?,
                NullRef::NotNull => {}
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct MeasuresReport {
    pub measures: Vec<MeasureInfo>,
    pub total: Beats,
    pub feedback: Vec<Feedback>,
}

impl From<Analysis<RhythmAnalysis>> for MeasuresReport {
    fn from(analysis: Analysis<RhythmAnalysis>) -> Self {
        MeasuresReport {
            measures: analysis.value.measures,
            total: analysis.value.total,
            feedback: analysis.feedback,
        }
    }
}

impl TextReport for MeasuresReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "measure\tlines\tstart\tbeats\tmeter\tstatus")?;
        for m in &self.measures {
            let meter = m
                .meter
                .map(|meter| meter.to_string())
                .unwrap_or_else(|| "-".to_string());
            let status = if m.pickup {
                "pickup".to_string()
            } else {
                format!("{:?}", m.completeness).to_lowercase()
            };
            writeln!(
                out,
                "{}\t{}-{}\t{}\t{}\t{}\t{}",
                m.display_number(),
                m.start_line + 1,
                m.end_line + 1,
                m.start_beat,
                m.duration,
                meter,
                status
            )?;
        }
        writeln!(out, "total\t{}", self.total)?;
        for fb in &self.feedback {
            writeln!(out, "{}", fb)?;
            if let Some(suggestion) = &fb.suggestion {
                writeln!(out, "  hint: {}", suggestion)?;
            }
        }
        Ok(())
    }
}
