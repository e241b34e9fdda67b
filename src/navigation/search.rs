//! In-memory list filtering
//!
//! Filtering never touches the repository: it narrows the rows that are
//! already loaded for the active view.

use super::state::Row;

/// Case-insensitive substring match against a composite string.
pub fn matches(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Keep the rows whose search text contains `query`. An empty query keeps all.
pub fn filter_rows<'a>(rows: Vec<Row<'a>>, query: &str) -> Vec<Row<'a>> {
    if query.trim().is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| matches(&row.search_text(), query))
        .collect()
}
