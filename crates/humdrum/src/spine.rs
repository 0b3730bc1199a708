//! Spine topology tracking.
//!
//! A Humdrum file is a left-to-right fold over its lines. The state is the list
//! of live columns, each carrying a track id and a path label. Manipulator
//! lines turn into a [`ColumnMap`] describing where every column of the next
//! line comes from; the same map is later replayed by the null-token resolver
//! so both passes agree on identity.
//!
//! ```text
//! **kern   **kern        1        2
//! *^       *             1        2          split
//! 4c  4e   4g            (1)a (1)b 2
//! *v  *v   *             (1)a (1)b 2          join
//! *-       *-            1        2
//! ```

use std::ops::Range;

use tracing::{debug, warn};

use crate::classify::{self, LineKind, Manipulator};
use crate::error::{Result, StructuralError};
use crate::file::{Field, HumdrumFile, Line, NullRef, Track, TrackId};

/// Which half of a split a column is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    A,
    B,
}

impl Branch {
    fn suffix(self) -> char {
        match self {
            Branch::A => 'a',
            Branch::B => 'b',
        }
    }
}

/// Where one column after a manipulator line comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// Passes through unchanged (also used for both halves of `*x`).
    Keep(usize),
    /// One half of a `*^`.
    Split { from: usize, branch: Branch },
    /// A `*v` run; the first column of the range is authoritative.
    Join(Range<usize>),
    /// A new track: the second half of `*+`, or a mid-file `**name`.
    Fresh { exclusive: String },
}

/// The column layout produced by one manipulator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    sources: Vec<ColumnSource>,
}

impl ColumnMap {
    /// Build the map for a manipulator line. `line` is 1-based, for errors.
    pub fn build(tokens: &[&str], line: usize) -> std::result::Result<Self, StructuralError> {
        let mut sources = Vec::with_capacity(tokens.len() + 1);
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            match Manipulator::parse(token) {
                Some(Manipulator::Split) => {
                    sources.push(ColumnSource::Split {
                        from: i,
                        branch: Branch::A,
                    });
                    sources.push(ColumnSource::Split {
                        from: i,
                        branch: Branch::B,
                    });
                }
                Some(Manipulator::Terminate) => {}
                Some(Manipulator::Add) => {
                    sources.push(ColumnSource::Keep(i));
                    sources.push(ColumnSource::Fresh {
                        exclusive: String::new(),
                    });
                }
                Some(Manipulator::Exchange) => {
                    if tokens.get(i + 1) != Some(&"*x") {
                        return Err(StructuralError::UnpairedExchange {
                            line,
                            column: i + 1,
                        });
                    }
                    sources.push(ColumnSource::Keep(i + 1));
                    sources.push(ColumnSource::Keep(i));
                    i += 2;
                    continue;
                }
                Some(Manipulator::Join) => {
                    let end = i + tokens[i..].iter().take_while(|t| **t == "*v").count();
                    if end - i < 2 {
                        return Err(StructuralError::LoneJoin {
                            line,
                            column: i + 1,
                        });
                    }
                    sources.push(ColumnSource::Join(i..end));
                    i = end;
                    continue;
                }
                None if classify::is_exclusive(token) => {
                    sources.push(ColumnSource::Fresh {
                        exclusive: token.to_string(),
                    });
                }
                None => sources.push(ColumnSource::Keep(i)),
            }
            i += 1;
        }

        Ok(ColumnMap { sources })
    }

    /// Number of columns after the manipulator line.
    pub fn width(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self) -> &[ColumnSource] {
        &self.sources
    }

    /// Carry per-column state across the manipulator line.
    ///
    /// `prev` holds one value per column of the manipulator line itself.
    pub fn apply<T: Clone>(
        &self,
        prev: &[T],
        mut split: impl FnMut(&T, Branch) -> T,
        mut join: impl FnMut(&[T]) -> T,
        mut fresh: impl FnMut(&str) -> T,
    ) -> Vec<T> {
        self.sources
            .iter()
            .map(|source| match source {
                ColumnSource::Keep(i) => prev[*i].clone(),
                ColumnSource::Split { from, branch } => split(&prev[*from], *branch),
                ColumnSource::Join(range) => join(&prev[range.clone()]),
                ColumnSource::Fresh { exclusive } => fresh(exclusive),
            })
            .collect()
    }
}

/// Label for one half of a split: `(<label>)a` / `(<label>)b`.
pub fn split_label(label: &str, branch: Branch) -> String {
    format!("({}){}", label, branch.suffix())
}

/// Label for a join: the space-joined labels, simplified.
pub fn join_labels<S: AsRef<str>>(labels: &[S]) -> String {
    let joined: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
    simplify_label(&joined.join(" "))
}

/// Collapse a two-component `(P)a (P)b` label into `P`. Any other label is
/// returned unchanged.
pub fn simplify_label(label: &str) -> String {
    if let [a, b] = top_level_components(label)[..] {
        if let (Some(left), Some(right)) = (split_parent(a, 'a'), split_parent(b, 'b')) {
            if left == right {
                return left.to_string();
            }
        }
    }
    label.to_string()
}

/// Split on spaces that are not nested inside parentheses.
fn top_level_components(label: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in label.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 => {
                if i > start {
                    parts.push(&label[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < label.len() {
        parts.push(&label[start..]);
    }
    parts
}

/// `(P)x` with a matching outer paren pair -> `P`.
fn split_parent(component: &str, suffix: char) -> Option<&str> {
    let inner = component.strip_suffix(suffix)?.strip_suffix(')')?;
    let body = inner.strip_prefix('(')?;
    // The opening paren must close exactly at the end, not earlier.
    let mut depth = 1usize;
    for c in body.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(body)
}

/// One live column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineSlot {
    pub track: TrackId,
    pub label: String,
}

/// Folds lines into spine-tracked [`Line`]s.
#[derive(Debug, Default)]
pub struct SpineTracker {
    columns: Vec<SpineSlot>,
    tracks: Vec<Track>,
    lines: Vec<Line>,
}

impl SpineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live columns after the most recent line.
    pub fn columns(&self) -> &[SpineSlot] {
        &self.columns
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn region_open(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Classify and track the next line of input.
    pub fn push_line(&mut self, raw: &str) -> Result<&Line> {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let index = self.lines.len();
        let number = index + 1;
        let kind = classify::classify_line(raw, self.region_open());

        let (fields, remap) = match &kind {
            LineKind::Empty => {
                if !raw.is_empty() {
                    if self.tracks.is_empty() {
                        return Err(StructuralError::WhitespaceLine { line: number }.into());
                    }
                    warn!(line = number, "whitespace-only line");
                }
                (Vec::new(), None)
            }
            LineKind::GlobalComment | LineKind::Bibliographic { .. } => (Vec::new(), None),
            LineKind::ExclusiveInterpretation => (self.open_region(raw, index), None),
            _ => self.track_spine_line(raw, &kind, index)?,
        };

        self.lines.push(Line {
            index,
            text: raw.to_string(),
            kind,
            fields,
            remap,
        });
        Ok(&self.lines[index])
    }

    /// Hand over the tracked lines. Null tokens are not resolved yet.
    pub fn finish(self) -> HumdrumFile {
        if self.region_open() {
            debug!(
                columns = self.columns.len(),
                "input ended without terminating every spine"
            );
        }
        HumdrumFile::new(self.lines, self.tracks)
    }

    fn new_track(tracks: &mut Vec<Track>, exclusive: &str, line: usize) -> SpineSlot {
        let id = TrackId(tracks.len() as u32 + 1);
        debug!(track = id.0, exclusive, line = line + 1, "new track");
        tracks.push(Track {
            id,
            exclusive: exclusive.to_string(),
            created_line: line,
            terminated_line: None,
        });
        SpineSlot {
            track: id,
            label: id.to_string(),
        }
    }

    fn open_region(&mut self, raw: &str, index: usize) -> Vec<Field> {
        let tokens = classify::split_fields(raw);
        self.columns = tokens
            .iter()
            .map(|t| Self::new_track(&mut self.tracks, t, index))
            .collect();
        self.fields_for(&tokens)
    }

    fn track_spine_line(
        &mut self,
        raw: &str,
        kind: &LineKind,
        index: usize,
    ) -> Result<(Vec<Field>, Option<ColumnMap>)> {
        let number = index + 1;
        let tokens = classify::split_fields(raw);

        if !self.region_open() {
            if kind.is_interpretation() {
                if let Some(column) = tokens.iter().position(|t| !classify::is_exclusive(t)) {
                    return Err(StructuralError::NotExclusive {
                        line: number,
                        column: column + 1,
                        token: tokens[column].to_string(),
                    }
                    .into());
                }
            }
            return Err(StructuralError::MissingExclusiveInterpretation { line: number }.into());
        }

        if tokens.len() != self.columns.len() {
            return Err(StructuralError::SpineCountMismatch {
                line: number,
                expected: self.columns.len(),
                found: tokens.len(),
            }
            .into());
        }

        if tokens.iter().any(|t| t.is_empty()) {
            warn!(line = number, "empty field");
        }

        let fields = self.fields_for(&tokens);

        if *kind != LineKind::SpineManipulator {
            return Ok((fields, None));
        }

        let map = ColumnMap::build(&tokens, number)?;
        self.apply_map(&map, index);
        Ok((fields, Some(map)))
    }

    fn apply_map(&mut self, map: &ColumnMap, index: usize) {
        let SpineTracker {
            columns, tracks, ..
        } = self;

        let next = map.apply(
            &columns[..],
            |slot, branch| SpineSlot {
                track: slot.track,
                label: split_label(&slot.label, branch),
            },
            |joined| SpineSlot {
                track: joined[0].track,
                label: join_labels(&joined.iter().map(|s| s.label.as_str()).collect::<Vec<_>>()),
            },
            |exclusive| Self::new_track(tracks, exclusive, index),
        );

        for slot in columns.iter() {
            if next.iter().all(|s| s.track != slot.track) {
                if let Some(track) = tracks.get_mut(slot.track.0 as usize - 1) {
                    if track.terminated_line.is_none() {
                        debug!(track = slot.track.0, line = index + 1, "track ends");
                        track.terminated_line = Some(index);
                    }
                }
            }
        }

        debug!(
            line = index + 1,
            before = columns.len(),
            after = next.len(),
            "applied manipulators"
        );
        *columns = next;
    }

    fn fields_for(&self, tokens: &[&str]) -> Vec<Field> {
        tokens
            .iter()
            .zip(&self.columns)
            .map(|(text, slot)| Field {
                text: text.to_string(),
                track: slot.track,
                label: slot.label.clone(),
                exclusive: self
                    .tracks
                    .get(slot.track.0 as usize - 1)
                    .map(|t| t.exclusive.clone())
                    .unwrap_or_default(),
                null_ref: NullRef::NotNull,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn track_all(lines: &[&str]) -> Result<SpineTracker> {
        let mut tracker = SpineTracker::new();
        for line in lines {
            tracker.push_line(line)?;
        }
        Ok(tracker)
    }

    fn labels(tracker: &SpineTracker) -> Vec<String> {
        tracker.columns().iter().map(|s| s.label.clone()).collect()
    }

    fn ids(tracker: &SpineTracker) -> Vec<u32> {
        tracker.columns().iter().map(|s| s.track.0).collect()
    }

    #[test]
    fn test_simplify_collapses_split_pair() {
        assert_eq!(simplify_label("(7)a (7)b"), "7");
        assert_eq!(simplify_label("(1 2)a (1 2)b"), "1 2");
        assert_eq!(simplify_label("((1)a)a ((1)a)b"), "(1)a");
    }

    #[test]
    fn test_simplify_only_two_components() {
        assert_eq!(simplify_label("(1)a (1)b 2"), "(1)a (1)b 2");
        assert_eq!(simplify_label("((1)a)a ((1)a)b (1)b"), "((1)a)a ((1)a)b (1)b");
    }

    #[test]
    fn test_simplify_leaves_unrelated_labels() {
        assert_eq!(simplify_label("1 2"), "1 2");
        assert_eq!(simplify_label("(1)a (2)b"), "(1)a (2)b");
        assert_eq!(simplify_label("(1)b (1)a"), "(1)b (1)a");
        assert_eq!(simplify_label("(1)a)b"), "(1)a)b");
    }

    #[test]
    fn test_top_level_components_respect_parens() {
        assert_eq!(top_level_components("(1 2)a 3"), vec!["(1 2)a", "3"]);
        assert_eq!(top_level_components("1"), vec!["1"]);
    }

    #[test]
    fn test_column_map_widths() {
        let map = ColumnMap::build(&["*^", "*", "*-"], 1).unwrap();
        assert_eq!(map.width(), 3);

        let map = ColumnMap::build(&["*v", "*v", "*v", "*+"], 1).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.sources()[0], ColumnSource::Join(0..3));

        let map = ColumnMap::build(&["*x", "*x", "**text"], 1).unwrap();
        assert_eq!(
            map.sources(),
            &[
                ColumnSource::Keep(1),
                ColumnSource::Keep(0),
                ColumnSource::Fresh {
                    exclusive: "**text".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_column_map_rejects_lone_join_and_exchange() {
        assert_eq!(
            ColumnMap::build(&["*v", "*"], 4),
            Err(StructuralError::LoneJoin { line: 4, column: 1 })
        );
        assert_eq!(
            ColumnMap::build(&["*", "*x", "*"], 9),
            Err(StructuralError::UnpairedExchange { line: 9, column: 2 })
        );
    }

    #[test]
    fn test_exclusive_line_creates_tracks() {
        let tracker = track_all(&["**kern\t**kern\t**dynam"]).unwrap();
        assert_eq!(ids(&tracker), vec![1, 2, 3]);
        assert_eq!(labels(&tracker), vec!["1", "2", "3"]);
        assert_eq!(tracker.tracks()[2].exclusive, "**dynam");
    }

    #[test]
    fn test_split_shares_track_id() {
        let tracker = track_all(&["**kern\t**kern", "*^\t*"]).unwrap();
        assert_eq!(ids(&tracker), vec![1, 1, 2]);
        assert_eq!(labels(&tracker), vec!["(1)a", "(1)b", "2"]);
    }

    #[test]
    fn test_split_then_join_restores_label() {
        let tracker = track_all(&["**kern", "*^", "4c\t4e", "*v\t*v"]).unwrap();
        assert_eq!(ids(&tracker), vec![1]);
        assert_eq!(labels(&tracker), vec!["1"]);
        assert_eq!(tracker.tracks()[0].terminated_line, None);
    }

    #[test]
    fn test_add_mints_new_track_after_column() {
        let tracker = track_all(&["**kern\t**kern", "*+\t*", "*\t**text\t*"]).unwrap();
        assert_eq!(ids(&tracker), vec![1, 4, 2]);
        assert_eq!(labels(&tracker), vec!["1", "4", "2"]);
        assert_eq!(tracker.tracks()[2].exclusive, "");
        assert_eq!(tracker.tracks()[3].exclusive, "**text");
        // The undeclared *+ track is replaced on line 3.
        assert_eq!(tracker.tracks()[2].terminated_line, Some(2));
    }

    #[test]
    fn test_terminate_marks_track() {
        let tracker = track_all(&["**kern\t**kern", "*\t*-", "4c"]).unwrap();
        assert_eq!(ids(&tracker), vec![1]);
        assert_eq!(tracker.tracks()[1].terminated_line, Some(1));
        assert_eq!(tracker.tracks()[0].terminated_line, None);
    }

    #[test]
    fn test_manipulator_line_fields_carry_old_layout() {
        let mut tracker = SpineTracker::new();
        tracker.push_line("**kern").unwrap();
        let line = tracker.push_line("*^").unwrap();
        assert_eq!(line.fields[0].label, "1");
        assert!(line.column_map().is_some());
        let line = tracker.push_line("4c\t4e").unwrap();
        assert_eq!(line.labels().collect::<Vec<_>>(), vec!["(1)a", "(1)b"]);
        assert_eq!(line.fields[1].exclusive, "**kern");
    }

    #[test]
    fn test_count_mismatch_is_fatal() {
        let err = track_all(&["**kern\t**kern\t**kern", "*^\t*\t*", "4c\t4d"])
            .err()
            .and_then(|e| e.as_structural().cloned());
        assert_eq!(
            err,
            Some(StructuralError::SpineCountMismatch {
                line: 3,
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn test_data_before_exclusive() {
        let err = track_all(&["4c"]).err().and_then(|e| e.as_structural().cloned());
        assert_eq!(
            err,
            Some(StructuralError::MissingExclusiveInterpretation { line: 1 })
        );
    }

    #[test]
    fn test_first_interpretation_must_be_exclusive() {
        let err = track_all(&["!! title", "**kern\t*clefG2"])
            .err()
            .and_then(|e| e.as_structural().cloned());
        assert_eq!(
            err,
            Some(StructuralError::NotExclusive {
                line: 2,
                column: 2,
                token: "*clefG2".to_string()
            })
        );
    }

    #[test]
    fn test_whitespace_line_after_final_termination() {
        let tracker = track_all(&["**kern", "4c", "*-", "   "]).unwrap();
        assert!(!tracker.region_open());
        assert_eq!(tracker.finish().lines()[3].kind, LineKind::Empty);
    }

    #[test]
    fn test_whitespace_line_before_region() {
        let err = track_all(&["   ", "**kern"])
            .err()
            .and_then(|e| e.as_structural().cloned());
        assert_eq!(err, Some(StructuralError::WhitespaceLine { line: 1 }));

        // Truly empty lines are fine anywhere.
        assert!(track_all(&["", "**kern", "", "4c", "*-"]).is_ok());
    }

    #[test]
    fn test_new_segment_after_full_termination() {
        let tracker = track_all(&["**kern", "4c", "*-", "**kern\t**kern", "4c\t4d"]).unwrap();
        assert_eq!(ids(&tracker), vec![2, 3]);
        assert_eq!(tracker.tracks()[0].terminated_line, Some(2));
    }
}
