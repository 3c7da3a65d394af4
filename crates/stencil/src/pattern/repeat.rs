//! Reading order for repeated pattern matches.
//!
//! Matches are read in rows, top to bottom, then left to right within a row.
//! Rows are formed by single-linkage on y: sorted by y, a match joins the
//! previous row when it sits at most `tolerance` below the previous match.

use std::cmp::Ordering;

use stencil_core::geometry::Point;

/// Returns the repeat index of every item, in input order.
///
/// Ties that survive row and x ordering fall back to y, then to the item's
/// id, so the result is total and deterministic.
///
/// # Examples
///
/// ```text
/// (50, 100) (200, 105)      row 0  -> 0, 1
/// (50, 400)                 row 1  -> 2
/// ```
pub(crate) fn repeat_indices(items: &[(Point, &str)], tolerance: f32) -> Vec<usize> {
    let mut by_y: Vec<usize> = (0..items.len()).collect();
    by_y.sort_by(|&a, &b| {
        items[a]
            .0
            .y()
            .total_cmp(&items[b].0.y())
            .then_with(|| items[a].0.x().total_cmp(&items[b].0.x()))
    });

    let mut row = vec![0usize; items.len()];
    let mut current = 0usize;
    for pair in by_y.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if items[next].0.y() - items[previous].0.y() > tolerance {
            current += 1;
        }
        row[next] = current;
    }

    let mut order = by_y;
    order.sort_by(|&a, &b| reading_order(items, &row, a, b));

    let mut indices = vec![0usize; items.len()];
    for (index, &item) in order.iter().enumerate() {
        indices[item] = index;
    }
    indices
}

fn reading_order(items: &[(Point, &str)], row: &[usize], a: usize, b: usize) -> Ordering {
    let (pa, ida) = items[a];
    let (pb, idb) = items[b];
    row[a]
        .cmp(&row[b])
        .then_with(|| pa.x().total_cmp(&pb.x()))
        .then_with(|| pa.y().total_cmp(&pb.y()))
        .then_with(|| ida.cmp(idb))
}
