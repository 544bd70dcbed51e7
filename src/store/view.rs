//! Derived view recomputation: filter by search, then sort

use std::cmp::Ordering;

use crate::rules::SearchState;
use crate::types::*;

/// Recompute the derived view from the canonical list.
///
/// Phase one filters through the search matcher applied to each
/// transaction's space-joined search text; without a usable matcher the
/// filter is the identity. Phase two sorts by the active key; `None` keeps
/// the filtered list in canonical (insertion) order. The result is built
/// complete before the caller swaps it in, so observers never see a
/// filtered-but-unsorted intermediate.
pub fn apply_search_and_sort(
    canonical: &[Transaction],
    search: &SearchState,
    sort: Option<SortKey>,
) -> Vec<Transaction> {
    let mut view: Vec<Transaction> = canonical
        .iter()
        .filter(|txn| search.matches(&txn.search_text()))
        .cloned()
        .collect();
    if let Some(key) = sort {
        view.sort_by(|a, b| compare(a, b, key));
    }
    view
}

fn compare(a: &Transaction, b: &Transaction, key: SortKey) -> Ordering {
    let ordering = match key.field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Amount => a.amount.cmp(&b.amount),
        SortField::Description => a
            .description
            .to_lowercase()
            .cmp(&b.description.to_lowercase()),
    };
    match key.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}
