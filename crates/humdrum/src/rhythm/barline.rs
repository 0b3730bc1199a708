//! Barline tokens: `=`, `=12`, `=12b:|!`, `==`.

use serde::{Deserialize, Serialize};
use winnow::ascii::digit1;
use winnow::combinator::opt;
use winnow::prelude::*;
use winnow::token::{one_of, rest};

type PResult<T> = winnow::ModalResult<T>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarStyle {
    Single,
    Double,
    Final,
    RepeatStart,
    RepeatEnd,
    RepeatBoth,
    Invisible,
    /// Anything else, kept verbatim.
    Other(String),
}

impl BarStyle {
    fn from_suffix(suffix: &str) -> BarStyle {
        match suffix {
            "" | "|" => BarStyle::Single,
            "||" => BarStyle::Double,
            "=" | "!" | "|!" => BarStyle::Final,
            "!|:" | "||:" | "|:" => BarStyle::RepeatStart,
            ":|!" | ":||" | ":|" => BarStyle::RepeatEnd,
            ":!!:" | ":|!|:" | ":||:" | ":!|!:" => BarStyle::RepeatBoth,
            "-" => BarStyle::Invisible,
            other => BarStyle::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BarStyle::Other(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barline {
    pub number: Option<u32>,
    /// Letter after the number (`=12b`), used for split measures.
    pub letter: Option<char>,
    pub style: BarStyle,
}

/// Parse a barline token.
pub fn parse_barline(input: &mut &str) -> PResult<Barline> {
    '='.parse_next(input)?;
    if opt('=').parse_next(input)?.is_some() {
        let _: &str = rest.parse_next(input)?;
        return Ok(Barline {
            number: None,
            letter: None,
            style: BarStyle::Final,
        });
    }
    let number: Option<u32> = opt(digit1.parse_to()).parse_next(input)?;
    let letter = opt(one_of('a'..='z')).parse_next(input)?;
    let suffix: &str = rest.parse_next(input)?;
    Ok(Barline {
        number,
        letter,
        style: BarStyle::from_suffix(suffix),
    })
}

/// Parse a whole barline token, `None` if it is not one.
pub fn barline(token: &str) -> Option<Barline> {
    let mut input = token;
    parse_barline(&mut input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_numbered() {
        assert_eq!(
            barline("="),
            Some(Barline {
                number: None,
                letter: None,
                style: BarStyle::Single
            })
        );
        assert_eq!(
            barline("=12"),
            Some(Barline {
                number: Some(12),
                letter: None,
                style: BarStyle::Single
            })
        );
    }

    #[test]
    fn test_letters_and_styles() {
        let bar = barline("=7b:|!").unwrap();
        assert_eq!(bar.number, Some(7));
        assert_eq!(bar.letter, Some('b'));
        assert_eq!(bar.style, BarStyle::RepeatEnd);

        assert_eq!(barline("=3||").unwrap().style, BarStyle::Double);
        assert_eq!(barline("=!|:").unwrap().style, BarStyle::RepeatStart);
        assert_eq!(barline("=-").unwrap().style, BarStyle::Invisible);
        assert_eq!(barline("==").unwrap().style, BarStyle::Final);
        assert_eq!(barline("==|").unwrap().style, BarStyle::Final);
    }

    #[test]
    fn test_unknown_style_is_kept() {
        let bar = barline("=4;").unwrap();
        assert_eq!(bar.style, BarStyle::Other(";".to_string()));
        assert!(!bar.style.is_known());
    }

    #[test]
    fn test_not_a_barline() {
        assert_eq!(barline("4c"), None);
    }
}
