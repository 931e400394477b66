//! Derived, read-only view of a collection: filter, then paginate.

use serde::Serialize;

use crate::filter::filter_records;
use crate::pagination::{page_count, Pagination};
use crate::record::Record;
use crate::schema::EntitySchema;

/// Why a view has no rows to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// The collection itself is empty.
    NoRecords,
    /// Records exist but none match the current filter.
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoRecords => "No records yet.",
            EmptyState::NoMatches => "No records match the current search.",
        }
    }
}

/// One rendered page of the filtered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub rows: Vec<Record>,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    /// Number of records after filtering.
    pub matched: usize,
    /// Number of records before filtering.
    pub total: usize,
    pub empty: Option<EmptyState>,
}

impl ListView {
    /// Build the page `pagination` points at from the filtered `records`.
    pub fn build(
        schema: &EntitySchema,
        records: &[Record],
        term: &str,
        pagination: &Pagination,
    ) -> Self {
        let filtered = filter_records(schema, records, term);
        let rows = pagination
            .slice(&filtered)
            .iter()
            .map(|r| (*r).clone())
            .collect();

        let empty = if records.is_empty() {
            Some(EmptyState::NoRecords)
        } else if filtered.is_empty() {
            Some(EmptyState::NoMatches)
        } else {
            None
        };

        let pages = page_count(filtered.len(), pagination.page_size());
        Self {
            rows,
            page: pagination.page().clamp(1, pages.max(1)),
            page_size: pagination.page_size(),
            page_count: pages,
            matched: filtered.len(),
            total: records.len(),
            empty,
        }
    }
}
