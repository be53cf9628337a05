//! Pure `(collection, QuerySpec) -> ListPage` transformation.
//!
//! Stage order is fixed: text filter, field filters, stable sort,
//! pagination. Every stage runs over the whole collection. A linear scan
//! is fine at the few-thousand-record scale these dashboards see, so the
//! engine is safe to call on every keystroke.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::query::{ListPage, QuerySpec, Searchable, SortOrder};
use crate::models::request::ApprovableRequest;
use crate::services::lifecycle;

/// Parses a backend request date.
///
/// The primary format is `DD/MM/YYYY`, parsed day first, never as ISO.
/// `YYYY-MM-DD` is accepted as a fallback for filter inputs.
pub fn parse_request_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn matches_text<T: Searchable>(item: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.searchable_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn matches_filters<T: Searchable>(item: &T, spec: &QuerySpec) -> bool {
    if let Some(status) = spec.status_filter {
        match item.status_key() {
            Some(s) if s == status => {}
            Some(_) => return false,
            None => {}
        }
    }

    if let Some(kind) = spec.type_filter.as_deref() {
        match item.type_key() {
            // The original matches type by containment, not equality.
            Some(label) if label.contains(kind) => {}
            Some(_) => return false,
            None => {}
        }
    }

    if spec.date_from.is_some() || spec.date_to.is_some() {
        if let Some(date) = item.date_key() {
            if let Some(from) = spec.date_from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = spec.date_to {
                if date > to {
                    return false;
                }
            }
        }
    }

    true
}

/// Runs the full query pipeline with a caller-supplied comparator.
///
/// The comparator must return `Ordering::Equal` for records it considers
/// tied; the sort is stable, so tied records keep their incoming order.
///
/// Fails with `InvalidQuery` only for a structurally invalid spec (zero
/// page or page size); an empty result is not an error. `page` is clamped
/// to `[1, total_pages]` with `total_pages = max(1, ceil(total/size))`.
pub fn query_with<T, F>(items: &[T], spec: &QuerySpec, compare: F) -> Result<ListPage<T>>
where
    T: Searchable + Clone,
    F: Fn(&T, &T) -> Ordering,
{
    if spec.page == 0 {
        return Err(AppError::InvalidQuery("page must be >= 1".to_string()));
    }
    if spec.page_size == 0 {
        return Err(AppError::InvalidQuery("page_size must be >= 1".to_string()));
    }

    let needle = spec.search_text.trim().to_lowercase();

    let mut filtered: Vec<T> = items
        .iter()
        .filter(|item| matches_text(*item, &needle))
        .filter(|item| matches_filters(*item, spec))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| compare(a, b));

    let total_count = filtered.len();
    let page_size = spec.page_size as usize;
    let total_pages = std::cmp::max(1, total_count.div_ceil(page_size)) as u32;
    let page = spec.page.clamp(1, total_pages);

    let start = (page as usize - 1) * page_size;
    let items = if start >= total_count {
        Vec::new()
    } else {
        filtered[start..std::cmp::min(start + page_size, total_count)].to_vec()
    };

    Ok(ListPage {
        items,
        total_count,
        page,
        total_pages,
    })
}

fn comparator_for(sort: SortOrder) -> impl Fn(&ApprovableRequest, &ApprovableRequest) -> Ordering {
    move |a, b| match sort {
        SortOrder::PendingFirstThenOldest => lifecycle::presentation_order(a, b),
        SortOrder::DateAscending => a.effective_date().cmp(&b.effective_date()),
        SortOrder::DateDescending => b.effective_date().cmp(&a.effective_date()),
        SortOrder::Unsorted => Ordering::Equal,
    }
}

/// Queries a request collection using the sort order named in the spec.
///
/// The default order is the canonical presentation rule: pending first,
/// then oldest first. Re-applied in full on every call, so the view stays
/// correct after any transition or filter change.
pub fn query_requests(
    items: &[ApprovableRequest],
    spec: &QuerySpec,
) -> Result<ListPage<ApprovableRequest>> {
    query_with(items, spec, comparator_for(spec.sort))
}
