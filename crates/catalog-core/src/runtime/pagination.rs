// crates/catalog-core/src/runtime/pagination.rs
// ============================================================================
// Module: Service Catalog Paginator
// Description: LIMIT/OFFSET window arithmetic for forward and inverted paging.
// Purpose: Translate page requests into scan windows with no storage dependency.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Forward paging walks the ordered source from the front. Inverted paging
//! presents the *tail* of the source as page 1 and walks backward: the window
//! is computed from the total row count, the scan still returns rows in
//! ascending order, and [`reverse_in_place`] restores presentation order.
//!
//! When an inverted page overruns the front of the data, the leading partial
//! page (`total % page_size` rows at offset 0) is served once; any page past
//! it is empty and no scan is needed. A zero page size never divides and
//! always yields an empty window.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ScanWindow;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub current_page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Present the last rows first.
    pub inverted: bool,
}

impl PageRequest {
    /// Creates a page request; page 0 is treated as page 1.
    #[must_use]
    pub fn new(current_page: u64, page_size: u64, inverted: bool) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size,
            inverted,
        }
    }

    /// Computes the scan window for a source holding `total` matching rows.
    #[must_use]
    pub fn window(&self, total: u64) -> PageWindow {
        compute_window(self.current_page, self.page_size, total, self.inverted)
    }
}

/// Scan window derived from a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    /// Rows to skip from the front of the ascending source.
    pub offset: u64,
    /// Maximum rows to fetch.
    pub limit: u64,
    /// The fetched slice must be reversed before presentation.
    pub needs_reverse: bool,
    /// The page holds no rows; skip the scan entirely.
    pub is_empty: bool,
}

impl PageWindow {
    /// Window for a page that cannot hold rows.
    const fn empty() -> Self {
        Self {
            offset: 0,
            limit: 0,
            needs_reverse: false,
            is_empty: true,
        }
    }

    /// Returns the store-facing scan window.
    #[must_use]
    pub const fn scan_window(&self) -> ScanWindow {
        ScanWindow {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

// ============================================================================
// SECTION: Window Arithmetic
// ============================================================================

/// Computes the LIMIT/OFFSET window for a page.
///
/// Forward: `offset = (page - 1) * size`, `limit = size`; pages past the end
/// are left to the store to return empty.
///
/// Inverted: `offset = total - page * size`. A negative offset means the page
/// reaches the front of the data; `limit` shrinks to `total % size` and the
/// page is served from offset 0 only if it is the leading partial page.
#[must_use]
pub fn compute_window(current_page: u64, page_size: u64, total: u64, inverted: bool) -> PageWindow {
    if page_size == 0 {
        return PageWindow::empty();
    }
    let page = i128::from(current_page.max(1));
    let size = i128::from(page_size);
    let total = i128::from(total);

    if !inverted {
        return PageWindow {
            offset: clamp_to_u64((page - 1).saturating_mul(size)),
            limit: page_size,
            needs_reverse: false,
            is_empty: false,
        };
    }

    let mut offset = total.saturating_sub(page.saturating_mul(size));
    let mut limit = size;
    if offset < 0 {
        limit = total % size;
        if offset >= limit - size {
            offset = 0;
        } else {
            return PageWindow::empty();
        }
    }
    if limit == 0 {
        return PageWindow::empty();
    }
    PageWindow {
        offset: clamp_to_u64(offset),
        limit: clamp_to_u64(limit),
        needs_reverse: true,
        is_empty: false,
    }
}

/// Reverses a fetched slice in place to restore presentation order.
pub fn reverse_in_place<T>(rows: &mut [T]) {
    rows.reverse();
}

/// Clamps an intermediate value into the `u64` range.
fn clamp_to_u64(value: i128) -> u64 {
    u64::try_from(value.max(0)).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn forward_first_page_starts_at_zero() {
        let window = compute_window(1, 10, 3, false);
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 10);
        assert!(!window.needs_reverse);
        assert!(!window.is_empty);
    }

    #[test]
    fn forward_page_past_end_is_left_to_the_store() {
        let window = compute_window(5, 3, 7, false);
        assert_eq!(window.offset, 12);
        assert_eq!(window.limit, 3);
        assert!(!window.is_empty);
    }

    #[test]
    fn inverted_full_page_selects_the_tail() {
        let window = compute_window(1, 3, 7, true);
        assert_eq!((window.offset, window.limit), (4, 3));
        assert!(window.needs_reverse);
        let window = compute_window(2, 3, 7, true);
        assert_eq!((window.offset, window.limit), (1, 3));
    }

    #[test]
    fn inverted_leading_partial_page_resets_to_front() {
        let window = compute_window(3, 3, 7, true);
        assert_eq!((window.offset, window.limit), (0, 1));
        assert!(window.needs_reverse);
        assert!(!window.is_empty);
    }

    #[test]
    fn inverted_page_beyond_partial_page_is_empty() {
        let window = compute_window(4, 3, 7, true);
        assert!(window.is_empty);
        assert_eq!(window.limit, 0);
    }

    #[test]
    fn inverted_divisible_total_has_no_partial_page() {
        assert_eq!(compute_window(2, 3, 6, true).offset, 0);
        assert_eq!(compute_window(2, 3, 6, true).limit, 3);
        assert!(compute_window(3, 3, 6, true).is_empty);
    }

    #[test]
    fn inverted_empty_source_is_empty() {
        assert!(compute_window(1, 10, 0, true).is_empty);
        assert!(compute_window(2, 10, 0, true).is_empty);
    }

    #[test]
    fn inverted_page_larger_than_total_serves_everything() {
        let window = compute_window(1, 10, 4, true);
        assert_eq!((window.offset, window.limit), (0, 4));
    }

    #[test]
    fn zero_page_size_is_empty_in_both_directions() {
        assert!(compute_window(1, 0, 10, false).is_empty);
        assert!(compute_window(1, 0, 10, true).is_empty);
        assert!(compute_window(3, 0, 0, true).is_empty);
    }

    #[test]
    fn page_zero_is_normalized_to_first_page() {
        let request = PageRequest::new(0, 5, false);
        assert_eq!(request.current_page, 1);
        assert_eq!(request.window(20).offset, 0);
        assert_eq!(compute_window(0, 5, 20, true), compute_window(1, 5, 20, true));
    }

    #[test]
    fn extreme_inputs_do_not_overflow() {
        let window = compute_window(u64::MAX, u64::MAX, u64::MAX, false);
        assert_eq!(window.offset, u64::MAX);
        assert!(compute_window(u64::MAX, u64::MAX, 5, true).is_empty);
    }

    #[test]
    fn reverse_in_place_restores_descending_order() {
        let mut rows = vec![1, 2, 3, 4];
        reverse_in_place(&mut rows);
        assert_eq!(rows, vec![4, 3, 2, 1]);
        let mut empty: Vec<u8> = Vec::new();
        reverse_in_place(&mut empty);
        assert!(empty.is_empty());
    }
}
