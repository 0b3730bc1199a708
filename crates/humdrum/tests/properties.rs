//! Whole-document properties of the tracker and the null resolver.

use humdrum::batch::{self, BatchSummary};
use humdrum::{parse, Coord, HumdrumFile, LineKind, NullRef, StructuralError};
use pretty_assertions::assert_eq;

const SCORE: &str = "\
!!!OTL: Properties
**kern\t**kern\t**text
*^\t*\t*
4c\t4e\t4g\tla
.\t4f\t.\tli
*\t*x\t*x\t*
4d\t4a\t4b\tlo
*v\t*v\t*\t*
2c\t.\t.
*+\t*\t*
4d\t.\t.\t.
*\t**dynam\t*\t*
4e\tp\t4f\tlu
*-\t*-\t*-\t*-
";

fn ids(file: &HumdrumFile, line: usize) -> Vec<u32> {
    file.line(line)
        .unwrap()
        .fields
        .iter()
        .map(|f| f.track.0)
        .collect()
}

fn labels(file: &HumdrumFile, line: usize) -> Vec<String> {
    file.line(line)
        .unwrap()
        .labels()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_track_ids_are_dense_and_increasing() {
    let file = parse(SCORE).unwrap();
    let ids: Vec<u32> = file.tracks().iter().map(|t| t.id.0).collect();
    assert_eq!(ids, (1..=file.max_track()).collect::<Vec<_>>());

    let created: Vec<usize> = file.tracks().iter().map(|t| t.created_line).collect();
    let mut sorted = created.clone();
    sorted.sort();
    assert_eq!(created, sorted);
}

#[test]
fn test_every_spine_line_matches_live_width() {
    let file = parse(SCORE).unwrap();
    let mut width = None;
    for line in file.lines() {
        if !line.kind.is_spine_bearing() {
            continue;
        }
        if let Some(w) = width {
            assert_eq!(line.fields.len(), w, "line {}", line.number());
        }
        width = Some(match line.column_map() {
            Some(map) => map.width(),
            None => line.fields.len(),
        });
    }
    assert_eq!(width, Some(0));
}

#[test]
fn test_split_then_join_is_identity() {
    let file = parse("**kern\t**kern\n4c\t4d\n*^\t*\n4c\t4e\t4d\n*v\t*v\t*\n4c\t4d\n*-\t*-\n").unwrap();
    assert_eq!(ids(&file, 1), ids(&file, 5));
    assert_eq!(labels(&file, 1), labels(&file, 5));
}

#[test]
fn test_minimal_null_resolution() {
    let file = parse("**kern\n4c\n.\n*-\n").unwrap();
    assert_eq!(
        file.line(2).unwrap().fields[0].null_ref,
        NullRef::Resolved(Coord::new(1, 0))
    );
}

#[test]
fn test_double_exchange_restores_order() {
    let file = parse("**kern\t**kern\n4c\t4d\n*x\t*x\n*x\t*x\n.\t.\n*-\t*-\n").unwrap();
    assert_eq!(ids(&file, 1), ids(&file, 4));
    let line = file.line(4).unwrap();
    assert_eq!(line.fields[0].null_ref, NullRef::Resolved(Coord::new(1, 0)));
    assert_eq!(line.fields[1].null_ref, NullRef::Resolved(Coord::new(1, 1)));
}

#[test]
fn test_three_way_join() {
    let file = parse("**kern\n*^\n*^\t*\n4c\t4d\t4e\n*v\t*v\t*v\n4f\n*-\n").unwrap();
    assert_eq!(labels(&file, 3), vec!["((1)a)a", "((1)a)b", "(1)b"]);
    assert_eq!(labels(&file, 5), vec!["((1)a)a ((1)a)b (1)b"]);
    assert_eq!(ids(&file, 5), vec![1]);
}

#[test]
fn test_join_of_pair_and_neighbour_keeps_labels() {
    let file = parse("**kern\t**kern\n*^\t*\n4c\t4d\t4e\n*v\t*v\t*v\n4f\n*-\n").unwrap();
    assert_eq!(labels(&file, 4), vec!["(1)a (1)b 2"]);
    assert_eq!(ids(&file, 4), vec![1]);
}

#[test]
fn test_trailing_whitespace_line_is_accepted() {
    let file = parse("**kern\n4c\n*-\n   \n").unwrap();
    assert_eq!(file.line(3).unwrap().kind, LineKind::Empty);
}

#[test]
fn test_split_with_too_many_fields_is_rejected() {
    let err = parse("**kern\t**kern\n*^\t*\t*\n").unwrap_err();
    assert_eq!(
        err.as_structural(),
        Some(&StructuralError::SpineCountMismatch {
            line: 2,
            expected: 2,
            found: 3
        })
    );
}

#[test]
fn test_data_line_after_split_must_match() {
    let err = parse("**kern\t**kern\n*^\t*\n4c\t4d\n*-\t*-\n").unwrap_err();
    assert_eq!(
        err.as_structural(),
        Some(&StructuralError::SpineCountMismatch {
            line: 3,
            expected: 3,
            found: 2
        })
    );
}

#[test]
fn test_score_shapes() {
    let file = parse(SCORE).unwrap();

    assert_eq!(ids(&file, 3), vec![1, 1, 2, 3]);
    assert_eq!(labels(&file, 3), vec!["(1)a", "(1)b", "2", "3"]);

    // After *x the second and third columns swap places.
    assert_eq!(ids(&file, 6), vec![1, 2, 1, 3]);
    assert_eq!(labels(&file, 6), vec!["(1)a", "2", "(1)b", "3"]);

    // Join of two unrelated neighbours keeps both names.
    assert_eq!(labels(&file, 8), vec!["(1)a 2", "(1)b", "3"]);
    assert_eq!(ids(&file, 8), vec![1, 1, 3]);

    // *+ and then a declared **dynam mint two tracks.
    assert_eq!(ids(&file, 10), vec![1, 4, 1, 3]);
    assert_eq!(ids(&file, 12), vec![1, 5, 1, 3]);
    assert_eq!(file.tracks()[4].exclusive, "**dynam");

    // Track 2 disappears into the join.
    assert_eq!(file.tracks()[1].terminated_line, Some(7));

    let nulls: Vec<_> = file.null_tokens().collect();
    assert!(nulls.contains(&(Coord::new(8, 1), NullRef::Resolved(Coord::new(6, 2)))));
    assert!(nulls.contains(&(Coord::new(10, 1), NullRef::Unresolved)));
    assert!(nulls.contains(&(Coord::new(4, 0), NullRef::Resolved(Coord::new(3, 0)))));
}

#[test]
fn test_classification_counts() {
    let file = parse(SCORE).unwrap();
    assert_eq!(file.lines_of(&LineKind::Data).count(), 6);
    assert_eq!(file.lines_of(&LineKind::SpineManipulator).count(), 6);
}

#[test]
fn test_batch_isolates_failures() {
    let outcomes = batch::process_texts([
        ("a.krn", SCORE),
        ("b.krn", "4c\n"),
        ("c.krn", "**kern\n4c\n*-\n"),
    ]);
    let summary = BatchSummary::from_outcomes(&outcomes);
    assert_eq!(summary.ok, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        outcomes[1].error().and_then(|e| e.as_structural()).map(|e| e.line()),
        Some(1)
    );
}
