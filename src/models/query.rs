use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::request::RequestStatus;

/// How the list query engine orders the filtered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Pending requests first, then submission date ascending. The default
    /// for request collections.
    #[default]
    PendingFirstThenOldest,
    /// Submission date ascending only.
    DateAscending,
    /// Submission date descending only.
    DateDescending,
    /// Keep the collection's current order (caller pre-sorted).
    Unsorted,
}

/// A declarative list query, constructed per render and never persisted.
///
/// Whenever a filter changes, the hosting UI must rebuild the spec with
/// `page = 1`; re-filtering always resets pagination. The engine clamps
/// out-of-range pages, but the reset itself is the caller's contract.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySpec {
    /// Case-insensitive substring matched against the searchable fields.
    /// Blank means "no text filter".
    pub search_text: String,
    /// Keep only this status; `None` means "todos".
    pub status_filter: Option<RequestStatus>,
    /// Keep only records whose type label contains this string; `None`
    /// means "todos".
    pub type_filter: Option<String>,
    /// Inclusive lower bound on the submission calendar date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the submission calendar date.
    pub date_to: Option<NaiveDate>,
    /// Sort applied after filtering.
    pub sort: SortOrder,
    /// 1-based page number; clamped to `[1, total_pages]`.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl QuerySpec {
    /// A spec with no filters, default sort, and the given page geometry.
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }
}

/// One page of a filtered, sorted collection.
///
/// Convention: `total_pages == max(1, ceil(total_count / page_size))`, so an
/// empty result still reports one (empty) page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    /// A contiguous slice of the filtered+sorted collection, at most
    /// `page_size` long.
    pub items: Vec<T>,
    /// Total records after filtering, across all pages.
    pub total_count: usize,
    /// The (clamped) page this slice corresponds to, 1-based.
    pub page: u32,
    /// Total pages at this `page_size`.
    pub total_pages: u32,
}

/// The seam between the generic engine and a concrete record type: which
/// fields the text filter scans, and which keys the field filters compare.
pub trait Searchable {
    /// Field values scanned by the case-insensitive text filter.
    fn searchable_fields(&self) -> Vec<&str>;

    /// Lifecycle status, for the status filter. `None` exempts the record.
    fn status_key(&self) -> Option<RequestStatus> {
        None
    }

    /// Type label, for the type filter. `None` exempts the record.
    fn type_key(&self) -> Option<&str> {
        None
    }

    /// Calendar date compared by the date-range filter. `None` exempts the
    /// record from date bounds.
    fn date_key(&self) -> Option<NaiveDate> {
        None
    }
}
