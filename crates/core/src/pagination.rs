//! Offset pagination: parameter normalization, range validation, and paged
//! results with metadata.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Page size used when the client does not supply a usable one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size the server will ever return.
pub const MAX_PAGE_SIZE: i64 = 50;

// ---------------------------------------------------------------------------
// Page request
// ---------------------------------------------------------------------------

/// Normalized pagination parameters. Both values are always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Normalize client-supplied values against the server defaults.
    ///
    /// Never fails: a missing or non-positive page number becomes 1, a
    /// missing or non-positive page size becomes [`DEFAULT_PAGE_SIZE`], and
    /// an oversized page size is clamped to [`MAX_PAGE_SIZE`].
    pub fn normalize(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        Self::normalize_with(page_number, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Same as [`normalize`](Self::normalize) with explicit limits.
    pub fn normalize_with(
        page_number: Option<i64>,
        page_size: Option<i64>,
        default_size: i64,
        max_size: i64,
    ) -> Self {
        let page_number = page_number.filter(|n| *n > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(default_size)
            .min(max_size);
        Self {
            page_number,
            page_size,
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    /// Number of rows to take.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// `true` iff `max >= min`.
///
/// Callers reject the request when this fails; the range is never corrected.
pub fn valid_range<T: PartialOrd>(min: T, max: T) -> bool {
    max >= min
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Pagination metadata reported alongside a page (the `X-Pagination` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationMetadata {
    /// Compute metadata for `request` over a filtered set of `total_count` rows.
    pub fn new(request: PageRequest, total_count: i64) -> Self {
        let total_count = total_count.max(0);
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + request.page_size - 1) / request.page_size
        };
        Self {
            current_page: request.page_number,
            page_size: request.page_size,
            total_count,
            total_pages,
            has_next: request.page_number < total_pages,
            has_previous: request.page_number > 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Paged list
// ---------------------------------------------------------------------------

/// A bounded page of items plus the metadata of the set it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub metadata: PaginationMetadata,
}

impl<T> PagedList<T> {
    /// Wrap a page already fetched by the persistence layer.
    ///
    /// `total_count` must be the size of the filtered (pre-pagination) set
    /// the page was taken from.
    pub fn from_page(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            items,
            metadata: PaginationMetadata::new(request, total_count),
        }
    }

    /// Filter, sort and paginate an in-memory collection.
    ///
    /// The total count is taken from the filtered set before skip/take.
    pub fn paginate<I, F, C>(source: I, filter: F, compare: C, request: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> bool,
        C: FnMut(&T, &T) -> Ordering,
    {
        let mut filtered: Vec<T> = source.into_iter().filter(filter).collect();
        filtered.sort_by(compare);
        let total_count = filtered.len() as i64;

        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(0);
        let items = filtered.into_iter().skip(skip).take(take).collect();

        Self::from_page(items, total_count, request)
    }

    /// Transform the items while keeping the metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            metadata: self.metadata,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
