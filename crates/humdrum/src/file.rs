//! The spine-tracked file handed to every consumer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{self, LineKind};
use crate::spine::ColumnMap;

/// Identity of a logical spine. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (line, column) position, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub line: usize,
    pub column: usize,
}

impl Coord {
    pub fn new(line: usize, column: usize) -> Self {
        Coord { line, column }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where a `.` on a data line points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullRef {
    /// Not a null data token.
    #[default]
    NotNull,
    /// Nearest earlier concrete token of the same spine.
    Resolved(Coord),
    /// The spine had no concrete token yet.
    Unresolved,
}

/// One token together with its spine identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub text: String,
    pub track: TrackId,
    pub label: String,
    pub exclusive: String,
    #[serde(default)]
    pub null_ref: NullRef,
}

impl Field {
    pub fn is_null(&self) -> bool {
        classify::is_null(&self.text)
    }
}

/// One input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// 0-based position in the file.
    pub index: usize,
    pub text: String,
    pub kind: LineKind,
    /// Empty for global comments, bibliographic records and empty lines.
    pub fields: Vec<Field>,
    /// Column layout produced by a manipulator line, replayed by later passes.
    #[serde(skip)]
    pub(crate) remap: Option<ColumnMap>,
}

impl Line {
    /// 1-based line number, as used in diagnostics.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn field(&self, column: usize) -> Option<&Field> {
        self.fields.get(column)
    }

    pub fn column_map(&self) -> Option<&ColumnMap> {
        self.remap.as_ref()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.label.as_str())
    }
}

/// A logical spine and its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    /// `**kern`, `**text`, ... Empty for a `*+` spine that was never declared.
    pub exclusive: String,
    pub created_line: usize,
    /// Line at which the last column carrying this track went away.
    pub terminated_line: Option<usize>,
}

/// A fully spine-tracked and null-resolved Humdrum file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HumdrumFile {
    pub name: Option<String>,
    pub(crate) lines: Vec<Line>,
    pub(crate) tracks: Vec<Track>,
}

impl HumdrumFile {
    pub(crate) fn new(lines: Vec<Line>, tracks: Vec<Track>) -> Self {
        HumdrumFile {
            name: None,
            lines,
            tracks,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        // Ids are assigned densely from 1.
        let index = (id.0 as usize).checked_sub(1)?;
        self.tracks.get(index)
    }

    /// Highest track id in the file, 0 when no spine was ever opened.
    pub fn max_track(&self) -> u32 {
        self.tracks.last().map(|t| t.id.0).unwrap_or(0)
    }

    pub fn field(&self, at: Coord) -> Option<&Field> {
        self.lines.get(at.line)?.fields.get(at.column)
    }

    /// The field a token stands for: itself, or the antecedent of a null.
    ///
    /// Returns `None` for unresolved nulls and out-of-range coordinates.
    pub fn resolve(&self, at: Coord) -> Option<&Field> {
        let field = self.field(at)?;
        match field.null_ref {
            NullRef::NotNull => Some(field),
            NullRef::Resolved(target) => self.field(target),
            NullRef::Unresolved => None,
        }
    }

    /// Iterate over lines of one kind.
    pub fn lines_of<'a>(&'a self, kind: &'a LineKind) -> impl Iterator<Item = &'a Line> + 'a {
        self.lines.iter().filter(move |l| &l.kind == kind)
    }

    /// Every null data token with its resolution.
    pub fn null_tokens(&self) -> impl Iterator<Item = (Coord, NullRef)> + '_ {
        self.lines.iter().flat_map(|line| {
            line.fields.iter().enumerate().filter_map(move |(column, f)| {
                match f.null_ref {
                    NullRef::NotNull => None,
                    r => Some((Coord::new(line.index, column), r)),
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(text: &str, track: u32) -> Field {
        Field {
            text: text.to_string(),
            track: TrackId(track),
            label: track.to_string(),
            exclusive: "**kern".to_string(),
            null_ref: NullRef::NotNull,
        }
    }

    #[test]
    fn test_track_lookup_is_one_based() {
        let file = HumdrumFile::new(
            Vec::new(),
            vec![Track {
                id: TrackId(1),
                exclusive: "**kern".to_string(),
                created_line: 0,
                terminated_line: None,
            }],
        );
        assert_eq!(file.track(TrackId(1)).map(|t| t.exclusive.as_str()), Some("**kern"));
        assert!(file.track(TrackId(0)).is_none());
        assert!(file.track(TrackId(2)).is_none());
        assert_eq!(file.max_track(), 1);
    }

    #[test]
    fn test_resolve_follows_null_reference() {
        let mut null = field(".", 1);
        null.null_ref = NullRef::Resolved(Coord::new(0, 0));
        let lines = vec![
            Line {
                index: 0,
                text: "4c".to_string(),
                kind: LineKind::Data,
                fields: vec![field("4c", 1)],
                remap: None,
            },
            Line {
                index: 1,
                text: ".".to_string(),
                kind: LineKind::Data,
                fields: vec![null],
                remap: None,
            },
        ];
        let file = HumdrumFile::new(lines, Vec::new());

        assert_eq!(file.resolve(Coord::new(1, 0)).map(|f| f.text.as_str()), Some("4c"));
        assert_eq!(file.resolve(Coord::new(0, 0)).map(|f| f.text.as_str()), Some("4c"));
        assert!(file.resolve(Coord::new(5, 0)).is_none());
        assert_eq!(file.null_tokens().count(), 1);
    }
}
