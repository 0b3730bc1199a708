//! Line classification and the literal token grammar.
//!
//! Classification looks at one line at a time. The only outside state it needs
//! is whether a spine region is currently open, which decides whether a line of
//! `**name` tokens starts new spines or manipulates existing ones.

use serde::{Deserialize, Serialize};

/// Placeholder token meaning "the previous event in this spine continues".
pub const NULL_TOKEN: &str = ".";

/// Column separator.
pub const FIELD_SEPARATOR: char = '\t';

/// What a line is, structurally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    Empty,
    GlobalComment,
    Bibliographic { key: String, value: String },
    LocalComment,
    ExclusiveInterpretation,
    SpineManipulator,
    TandemInterpretation,
    Measure,
    Data,
}

impl LineKind {
    /// Lines that carry one field per live spine.
    pub fn is_spine_bearing(&self) -> bool {
        !matches!(
            self,
            LineKind::Empty | LineKind::GlobalComment | LineKind::Bibliographic { .. }
        )
    }

    pub fn is_interpretation(&self) -> bool {
        matches!(
            self,
            LineKind::ExclusiveInterpretation
                | LineKind::SpineManipulator
                | LineKind::TandemInterpretation
        )
    }
}

/// The five single-token spine manipulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Manipulator {
    /// `*^`
    Split,
    /// `*v`
    Join,
    /// `*x`
    Exchange,
    /// `*+`
    Add,
    /// `*-`
    Terminate,
}

impl Manipulator {
    pub fn parse(token: &str) -> Option<Manipulator> {
        match token {
            "*^" => Some(Manipulator::Split),
            "*v" => Some(Manipulator::Join),
            "*x" => Some(Manipulator::Exchange),
            "*+" => Some(Manipulator::Add),
            "*-" => Some(Manipulator::Terminate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Manipulator::Split => "*^",
            Manipulator::Join => "*v",
            Manipulator::Exchange => "*x",
            Manipulator::Add => "*+",
            Manipulator::Terminate => "*-",
        }
    }
}

/// True for `**name` where name is `[A-Za-z0-9_-]+`.
pub fn is_exclusive(token: &str) -> bool {
    match token.strip_prefix("**") {
        Some(name) => {
            !name.is_empty()
                && name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        }
        None => false,
    }
}

pub fn is_null(token: &str) -> bool {
    token == NULL_TOKEN
}

/// Split a line into its tab-separated fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(FIELD_SEPARATOR).collect()
}

/// Parse `!!!KEY: value`. Keys may not contain whitespace or start with `!`.
pub fn parse_bibliographic(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("!!!")?;
    let (key, value) = rest.split_once(':')?;
    if key.is_empty() || key.starts_with('!') || key.chars().any(char::is_whitespace) {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Classify a raw line (without its line terminator).
///
/// `region_open` is true while at least one spine is live.
pub fn classify_line(line: &str, region_open: bool) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Empty;
    }

    if line.starts_with("!!") {
        return match parse_bibliographic(line) {
            Some((key, value)) => LineKind::Bibliographic { key, value },
            None => LineKind::GlobalComment,
        };
    }

    if line.starts_with('!') {
        return LineKind::LocalComment;
    }

    if line.starts_with('=') {
        return LineKind::Measure;
    }

    if line.starts_with('*') {
        return classify_interpretation(&split_fields(line), region_open);
    }

    LineKind::Data
}

fn classify_interpretation(tokens: &[&str], region_open: bool) -> LineKind {
    if !region_open && tokens.iter().all(|t| is_exclusive(t)) {
        return LineKind::ExclusiveInterpretation;
    }

    let manipulates = tokens
        .iter()
        .any(|t| Manipulator::parse(t).is_some() || (region_open && is_exclusive(t)));

    if manipulates {
        LineKind::SpineManipulator
    } else {
        LineKind::TandemInterpretation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_grammar() {
        assert!(is_exclusive("**kern"));
        assert!(is_exclusive("**dynam"));
        assert!(is_exclusive("**my_spine-2"));
        assert!(!is_exclusive("**"));
        assert!(!is_exclusive("*kern"));
        assert!(!is_exclusive("**ke rn"));
        assert!(!is_exclusive("**kern!"));
    }

    #[test]
    fn test_manipulators_are_exact() {
        assert_eq!(Manipulator::parse("*^"), Some(Manipulator::Split));
        assert_eq!(Manipulator::parse("*v"), Some(Manipulator::Join));
        assert_eq!(Manipulator::parse("*x"), Some(Manipulator::Exchange));
        assert_eq!(Manipulator::parse("*+"), Some(Manipulator::Add));
        assert_eq!(Manipulator::parse("*-"), Some(Manipulator::Terminate));
        assert_eq!(Manipulator::parse("*vv"), None);
        assert_eq!(Manipulator::parse("*"), None);
        assert_eq!(Manipulator::parse("*X"), None);
    }

    #[test]
    fn test_comments_and_records() {
        assert_eq!(
            classify_line("!!!COM: Bach, Johann Sebastian", true),
            LineKind::Bibliographic {
                key: "COM".to_string(),
                value: "Bach, Johann Sebastian".to_string(),
            }
        );
        assert_eq!(classify_line("!! a global comment", true), LineKind::GlobalComment);
        assert_eq!(classify_line("!!!no colon here", false), LineKind::GlobalComment);
        assert_eq!(classify_line("!\t! voice 2", true), LineKind::LocalComment);
    }

    #[test]
    fn test_interpretation_kinds() {
        assert_eq!(
            classify_line("**kern\t**kern", false),
            LineKind::ExclusiveInterpretation
        );
        assert_eq!(
            classify_line("**kern\t**kern", true),
            LineKind::SpineManipulator
        );
        assert_eq!(classify_line("*^\t*", true), LineKind::SpineManipulator);
        assert_eq!(classify_line("*\t*+", true), LineKind::SpineManipulator);
        assert_eq!(classify_line("*clefG2\t*M3/4", true), LineKind::TandemInterpretation);
        assert_eq!(
            classify_line("**kern\t*", false),
            LineKind::TandemInterpretation
        );
    }

    #[test]
    fn test_measures_data_and_empty() {
        assert_eq!(classify_line("=1\t=1", true), LineKind::Measure);
        assert_eq!(classify_line("==\t==", true), LineKind::Measure);
        assert_eq!(classify_line("4c\t.", true), LineKind::Data);
        assert_eq!(classify_line("", true), LineKind::Empty);
        assert_eq!(classify_line("  \t ", false), LineKind::Empty);
    }

    #[test]
    fn test_spine_bearing() {
        assert!(LineKind::Data.is_spine_bearing());
        assert!(LineKind::LocalComment.is_spine_bearing());
        assert!(LineKind::SpineManipulator.is_spine_bearing());
        assert!(!LineKind::GlobalComment.is_spine_bearing());
        assert!(!LineKind::Empty.is_spine_bearing());
    }
}
