//! Boundary validation for footprints.

use satchel_utils::{CellPos, Footprint};

/// Returns whether `footprint` anchored at `origin` lies fully inside a `columns` x `rows` grid.
///
/// Callers must run this before touching any per-cell state of the region.
#[must_use]
pub fn fits(columns: i32, rows: i32, origin: CellPos, footprint: Footprint) -> bool {
    if origin.col < 0 || origin.row < 0 {
        return false;
    }

    // Widen so a huge origin can't wrap around into range.
    let right = i64::from(origin.col) + i64::from(footprint.width());
    let bottom = i64::from(origin.row) + i64::from(footprint.height());
    right <= i64::from(columns) && bottom <= i64::from(rows)
}

/// Returns whether a single cell lies inside a `columns` x `rows` grid.
#[must_use]
pub fn contains(columns: i32, rows: i32, cell: CellPos) -> bool {
    fits(columns, rows, cell, Footprint::UNIT)
}
