// crates/catalog-core/src/core/query.rs
// ============================================================================
// Module: Service Catalog Query Shapes
// Description: Record sources, sort keys, name filters, and scan windows.
// Purpose: Describe count/scan requests independently of any storage engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Reads target either the raw service table (creation order) or the
//! name-sorted projection. The projection is refreshed asynchronously and may
//! lag the table; callers that pick [`RecordSource::SortedView`] accept that.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Source a count or scan is issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Raw service table, ordered by creation.
    Table,
    /// Name-sorted projection of the service table.
    SortedView,
}

impl RecordSource {
    /// Returns a stable label for events and diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::SortedView => "sorted_view",
        }
    }
}

/// Requested listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Order of registration in the catalog.
    #[default]
    #[serde(rename = "date")]
    Created,
    /// Alphabetical by service name.
    Name,
}

impl SortKey {
    /// Returns the record source that serves this order.
    #[must_use]
    pub const fn source(self) -> RecordSource {
        match self {
            Self::Created => RecordSource::Table,
            Self::Name => RecordSource::SortedView,
        }
    }
}

// ============================================================================
// SECTION: Filters and Windows
// ============================================================================

/// Case-sensitive substring filter over service names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameFilter {
    /// Substring to match; empty matches everything.
    term: String,
}

impl NameFilter {
    /// Returns a filter matching every service.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns a filter matching names that contain `term`.
    #[must_use]
    pub fn contains(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
        }
    }

    /// Returns the raw substring.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Returns true when `name` satisfies the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.term.is_empty() || name.contains(self.term.as_str())
    }
}

/// LIMIT/OFFSET window for an ordered scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanWindow {
    /// Rows to skip from the front of the ordered source.
    pub offset: u64,
    /// Maximum rows to return.
    pub limit: u64,
}
