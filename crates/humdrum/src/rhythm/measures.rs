//! Measure boundaries and completeness.

use num_traits::CheckedSub;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::barline::{barline, BarStyle, Barline};
use super::duration::Beats;
use super::meter::{meter_change, Meter, MeterChange};
use super::LineTiming;
use crate::classify::LineKind;
use crate::feedback::FeedbackCollector;
use crate::file::HumdrumFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Underfull,
    Overfull,
    /// No time signature in effect.
    Unmetered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureInfo {
    pub index: usize,
    pub number: Option<u32>,
    pub letter: Option<char>,
    /// Barline line that opens the measure, or the first line of the file.
    pub start_line: usize,
    /// Barline line that closes the measure, or the last line of the file.
    pub end_line: usize,
    pub start_beat: Beats,
    pub duration: Beats,
    pub left: Option<BarStyle>,
    pub right: Option<BarStyle>,
    pub meter: Option<Meter>,
    pub pickup: bool,
    pub completeness: Completeness,
}

impl MeasureInfo {
    /// Number as written (`12`, `12b`), or `#<index>` for unnumbered measures.
    pub fn display_number(&self) -> String {
        match (self.number, self.letter) {
            (Some(n), Some(l)) => format!("{}{}", n, l),
            (Some(n), None) => n.to_string(),
            _ => format!("#{}", self.index),
        }
    }
}

struct OpenMeasure {
    number: Option<u32>,
    letter: Option<char>,
    start_line: usize,
    start_beat: Beats,
    left: Option<BarStyle>,
    meter: Option<Meter>,
    has_data: bool,
}

impl OpenMeasure {
    fn at_start() -> Self {
        OpenMeasure {
            number: None,
            letter: None,
            start_line: 0,
            start_beat: Beats::from_integer(0),
            left: None,
            meter: None,
            has_data: false,
        }
    }

    fn after(bar: Barline, line: usize, beat: Beats) -> Self {
        OpenMeasure {
            number: bar.number,
            letter: bar.letter,
            start_line: line,
            start_beat: beat,
            left: Some(bar.style),
            meter: None,
            has_data: false,
        }
    }

    fn close(
        self,
        end_line: usize,
        end_beat: Beats,
        right: Option<BarStyle>,
        out: &mut Vec<MeasureInfo>,
        collector: &mut FeedbackCollector,
    ) {
        if !self.has_data {
            return;
        }
        let Some(duration) = end_beat.checked_sub(&self.start_beat) else {
            collector.set_position(self.start_line + 1, 1);
            collector.error(format!(
                "length of measure starting at beat {} is not representable; measure skipped",
                self.start_beat
            ));
            return;
        };
        out.push(MeasureInfo {
            index: out.len(),
            number: self.number,
            letter: self.letter,
            start_line: self.start_line,
            end_line,
            start_beat: self.start_beat,
            duration,
            left: self.left,
            right,
            meter: self.meter,
            pickup: false,
            completeness: Completeness::Unmetered,
        });
    }
}

/// Split the file into measures using the barlines in the first column.
pub(crate) fn build(
    file: &HumdrumFile,
    timings: &[LineTiming],
    total: Beats,
    collector: &mut FeedbackCollector,
) -> Vec<MeasureInfo> {
    let mut measures = Vec::new();
    let mut meter: Option<Meter> = None;
    let mut open = OpenMeasure::at_start();

    for line in file.lines() {
        let beat = timings
            .get(line.index)
            .map(|t| t.beat)
            .unwrap_or(total);

        match &line.kind {
            kind if kind.is_interpretation() => {
                for field in &line.fields {
                    match meter_change(&field.text) {
                        Some(MeterChange::Set(m)) => meter = Some(m),
                        Some(MeterChange::Clear) => meter = None,
                        None => {}
                    }
                }
            }
            LineKind::Data => {
                if !open.has_data {
                    open.has_data = true;
                    open.meter = meter;
                }
            }
            LineKind::Measure => {
                let token = line.fields.first().map(|f| f.text.as_str()).unwrap_or("=");
                let bar = barline(token).unwrap_or_else(|| Barline {
                    number: None,
                    letter: None,
                    style: BarStyle::Other(token.to_string()),
                });
                if !bar.style.is_known() {
                    collector.set_position(line.number(), 1);
                    collector.info(format!("unrecognized barline {:?}", token));
                }
                open.close(line.index, beat, Some(bar.style.clone()), &mut measures, collector);
                open = OpenMeasure::after(bar, line.index, beat);
            }
            _ => {}
        }
    }

    open.close(file.len().saturating_sub(1), total, None, &mut measures, collector);
    classify(&mut measures, collector);
    measures
}

fn classify(measures: &mut [MeasureInfo], collector: &mut FeedbackCollector) {
    for m in measures.iter_mut() {
        m.completeness = match m.meter {
            None => Completeness::Unmetered,
            Some(meter) => match m.duration.cmp(&meter.measure_length()) {
                Ordering::Less => Completeness::Underfull,
                Ordering::Equal => Completeness::Complete,
                Ordering::Greater => Completeness::Overfull,
            },
        };
    }

    if measures.len() > 1 && measures[0].completeness == Completeness::Underfull {
        measures[0].pickup = true;
    }

    let last = measures.len().saturating_sub(1);
    for m in measures.iter() {
        let Some(meter) = m.meter else { continue };
        collector.set_position(m.start_line + 1, 1);
        let detail = format!(
            "{} of {} quarter notes in {}",
            m.duration,
            meter.measure_length(),
            meter
        );
        match m.completeness {
            Completeness::Underfull if m.pickup => {}
            Completeness::Underfull if m.index == last => {
                collector.info(format!("final measure {} is underfull: {}", m.display_number(), detail));
            }
            Completeness::Underfull => {
                collector.warning(format!("measure {} is underfull: {}", m.display_number(), detail));
            }
            Completeness::Overfull => {
                collector.warning(format!("measure {} is overfull: {}", m.display_number(), detail));
            }
            Completeness::Complete | Completeness::Unmetered => {}
        }
    }
}
