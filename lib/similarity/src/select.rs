// Top-N selection against a reference row
use ordered_float::OrderedFloat;
use skinmatch_core::{Error, Result};
use std::cmp::Reverse;

use crate::engine::SimilarityLookup;

/// Rows most similar to `reference_row`, best first, at most `n` of them
///
/// The reference itself is never returned. Equal scores keep row order.
pub fn select_top_n<L>(lookup: &L, reference_row: usize, n: usize) -> Result<Vec<usize>>
where
    L: SimilarityLookup + ?Sized,
{
    if reference_row >= lookup.len() {
        return Err(Error::ReferenceNotFound(format!("row {reference_row}")));
    }

    let scores = lookup.row(reference_row);
    let mut order: Vec<usize> = (0..lookup.len()).filter(|&row| row != reference_row).collect();
    // sort_by_key is stable, so ties stay in row order
    order.sort_by_key(|&row| Reverse(OrderedFloat(scores[row])));
    order.truncate(n);
    Ok(order)
}
