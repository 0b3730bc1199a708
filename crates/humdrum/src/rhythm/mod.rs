//! Rhythm and measure analysis on top of a spine-tracked file.
//!
//! Every line gets an absolute position in quarter notes, computed exactly
//! with rationals. A data line lasts until the earliest pending note end in
//! any rhythmic spine; everything else is instantaneous.

pub mod barline;
pub mod duration;
mod measures;
pub mod meter;

use num_traits::{CheckedAdd, CheckedSub};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::classify::LineKind;
use crate::feedback::{Analysis, FeedbackCollector};
use crate::file::HumdrumFile;

pub use barline::{BarStyle, Barline};
pub use duration::{token_duration, Beats};
pub use measures::{Completeness, MeasureInfo};
pub use meter::{Meter, MeterChange};

/// Which spines carry durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhythmOptions {
    pub rhythm_spines: Vec<String>,
}

impl Default for RhythmOptions {
    fn default() -> Self {
        RhythmOptions {
            rhythm_spines: vec!["**kern".to_string(), "**recip".to_string()],
        }
    }
}

impl RhythmOptions {
    pub fn is_rhythmic(&self, exclusive: &str) -> bool {
        self.rhythm_spines.iter().any(|s| s == exclusive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTiming {
    pub beat: Beats,
    pub duration: Beats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmAnalysis {
    /// One entry per line of the file.
    pub timings: Vec<LineTiming>,
    pub measures: Vec<MeasureInfo>,
    pub total: Beats,
}

impl RhythmAnalysis {
    pub fn beat_of(&self, line: usize) -> Option<Beats> {
        self.timings.get(line).map(|t| t.beat)
    }

    pub fn pickup(&self) -> Option<&MeasureInfo> {
        self.measures.iter().find(|m| m.pickup)
    }
}

/// Compute line timings and measures.
pub fn analyze(file: &HumdrumFile, options: &RhythmOptions) -> Analysis<RhythmAnalysis> {
    let mut collector = FeedbackCollector::new();
    let (timings, total) = line_timings(file, options, &mut collector);
    let measures = measures::build(file, &timings, total, &mut collector);

    Analysis::new(
        RhythmAnalysis {
            timings,
            measures,
            total,
        },
        collector.into_feedback(),
    )
}

fn line_timings(
    file: &HumdrumFile,
    options: &RhythmOptions,
    collector: &mut FeedbackCollector,
) -> (Vec<LineTiming>, Beats) {
    let zero = Beats::from_integer(0);
    let mut now = zero;
    let mut pending: BinaryHeap<Reverse<Beats>> = BinaryHeap::new();
    let mut timings = Vec::with_capacity(file.len());

    for line in file.lines() {
        if line.kind != LineKind::Data {
            timings.push(LineTiming {
                beat: now,
                duration: zero,
            });
            continue;
        }

        for (column, field) in line.fields.iter().enumerate() {
            if field.is_null() || !options.is_rhythmic(&field.exclusive) {
                continue;
            }
            collector.set_position(line.number(), column + 1);
            match token_duration(&field.text) {
                Some(d) if d > zero => match now.checked_add(&d) {
                    Some(end) => pending.push(Reverse(end)),
                    None => collector.error(format!(
                        "end of {:?} at beat {} is not representable; token skipped",
                        field.text, now
                    )),
                },
                Some(_) => {}
                None => collector.warning_with_suggestion(
                    format!("token {:?} has no duration", field.text),
                    "Add a reciprocal rhythm such as 4 or 8.",
                ),
            }
        }

        while let Some(Reverse(end)) = pending.peek() {
            if *end > now {
                break;
            }
            pending.pop();
        }
        let next = pending.peek().map(|Reverse(end)| *end);
        let duration = match next {
            Some(end) => end.checked_sub(&now).unwrap_or_else(|| {
                collector.set_position(line.number(), 1);
                collector.error(format!("duration of line ending at beat {} is not representable", end));
                zero
            }),
            None => zero,
        };
        timings.push(LineTiming {
            beat: now,
            duration,
        });
        now = next.unwrap_or(now);
    }

    (timings, now)
}
