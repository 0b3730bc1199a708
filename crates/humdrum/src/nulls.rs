//! Null-token resolution.
//!
//! Second pass over a tracked file. Every live column keeps a pointer to the
//! last concrete data token seen in it; manipulator lines move those pointers
//! with the same [`ColumnMap`](crate::spine::ColumnMap) the tracker used, so a
//! `.` always points into its own spine even across splits and exchanges.

use crate::classify::LineKind;
use crate::file::{Coord, HumdrumFile, Line, NullRef};

/// Fill in [`NullRef`] for every null token on a data line.
pub fn resolve(file: &mut HumdrumFile) {
    resolve_lines(&mut file.lines);
}

pub(crate) fn resolve_lines(lines: &mut [Line]) {
    let mut last: Vec<Option<Coord>> = Vec::new();

    for line in lines.iter_mut() {
        match line.kind {
            LineKind::ExclusiveInterpretation => {
                last = vec![None; line.fields.len()];
            }
            LineKind::SpineManipulator => {
                if let Some(map) = &line.remap {
                    last = map.apply(&last, |p, _| *p, |joined| joined[0], |_| None);
                }
            }
            LineKind::Data => {
                let index = line.index;
                for (column, field) in line.fields.iter_mut().enumerate() {
                    let Some(pointer) = last.get_mut(column) else {
                        continue;
                    };
                    if field.is_null() {
                        field.null_ref = match pointer {
                            Some(at) => NullRef::Resolved(*at),
                            None => NullRef::Unresolved,
                        };
                    } else {
                        *pointer = Some(Coord::new(index, column));
                    }
                }
            }
            _ => {}
        }
    }
}
