//! Time signature interpretations (`*M3/4`, `*MX`).

use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::ascii::digit1;
use winnow::combinator::alt;
use winnow::prelude::*;

use super::duration::Beats;

type PResult<T> = winnow::ModalResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    pub numerator: u32,
    pub denominator: u32,
}

impl Meter {
    /// Length of a full measure in quarter notes.
    pub fn measure_length(&self) -> Beats {
        Beats::new(i64::from(self.numerator) * 4, i64::from(self.denominator))
    }
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// What a meter interpretation does to the prevailing meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterChange {
    Set(Meter),
    /// `*MX`: unmeasured music from here on.
    Clear,
}

fn parse_fraction(input: &mut &str) -> PResult<Meter> {
    let numerator: u32 = digit1.parse_to().parse_next(input)?;
    '/'.parse_next(input)?;
    let denominator: u32 = digit1.parse_to().parse_next(input)?;
    Ok(Meter {
        numerator,
        denominator,
    })
}

/// Parse the body of a meter interpretation after `*M`.
pub fn parse_meter(input: &mut &str) -> PResult<MeterChange> {
    "*M".parse_next(input)?;
    alt((
        parse_fraction.map(MeterChange::Set),
        "X".map(|_| MeterChange::Clear),
    ))
    .parse_next(input)
}

/// Interpret a whole token. Metronome marks (`*MM120`) are not meters.
pub fn meter_change(token: &str) -> Option<MeterChange> {
    let mut input = token;
    let change = parse_meter(&mut input).ok()?;
    if !input.is_empty() {
        return None;
    }
    match change {
        MeterChange::Set(m) if m.denominator == 0 => None,
        other => Some(other),
    }
}
