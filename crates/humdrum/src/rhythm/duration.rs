//! Reciprocal-rhythm durations using winnow combinators.
//!
//! Durations are exact fractions of a quarter note: `4` is one beat, `8.` is
//! three quarters of a beat, `0` is a breve (eight beats), `3%2` is a dotless
//! triplet whole note (8/3 beats).

use num_rational::Rational64;
use num_traits::CheckedMul;
use winnow::ascii::digit1;
use winnow::combinator::{opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

type PResult<T> = winnow::ModalResult<T>;

/// Exact time in quarter notes.
pub type Beats = Rational64;

const MAX_DOTS: usize = 16;

/// Parse a reciprocal rhythm value (`4`, `8..`, `00`, `3%2`).
pub fn parse_recip(input: &mut &str) -> PResult<Beats> {
    let digits: &str = digit1.parse_next(input)?;
    let divisor: Option<&str> = opt(preceded('%', digit1)).parse_next(input)?;
    let dots: &str = take_while(0.., '.').parse_next(input)?;
    let dots = dots.len();

    let base = match divisor {
        None if digits.bytes().all(|b| b == b'0') => {
            // 0 = breve, 00 = long, 000 = maxima
            if digits.len() > 8 {
                return Err(ErrMode::Backtrack(ContextError::new()));
            }
            Beats::from_integer(4 << digits.len())
        }
        _ => {
            let numerator: i64 = parse_int(digits)?;
            let denominator: i64 = match divisor {
                Some(d) => parse_int(d)?,
                None => 1,
            };
            match 4i64.checked_mul(denominator) {
                Some(scaled) if numerator != 0 && denominator != 0 => Beats::new(scaled, numerator),
                _ => return Err(ErrMode::Backtrack(ContextError::new())),
            }
        }
    };

    if dots > MAX_DOTS {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    augment(base, dots).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

fn parse_int(digits: &str) -> PResult<i64> {
    digits
        .parse()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

/// Apply augmentation dots: each dot adds half of the previous addition.
/// `None` when the result does not fit.
pub fn augment(base: Beats, dots: usize) -> Option<Beats> {
    let scale = 1i64 << dots;
    base.checked_mul(&Beats::new(2 * scale - 1, scale))
}

/// Duration of a **kern / **recip token.
///
/// Only the first space-separated subtoken of a chord is considered. Grace
/// notes are zero-length. Returns `None` when the token has no rhythm.
pub fn token_duration(token: &str) -> Option<Beats> {
    let first = token.split(' ').next().unwrap_or(token);
    if first.contains(['q', 'Q']) {
        return Some(Beats::from_integer(0));
    }
    let start = first.find(|c: char| c.is_ascii_digit())?;
    let mut rest = &first[start..];
    parse_recip(&mut rest).ok()
}
