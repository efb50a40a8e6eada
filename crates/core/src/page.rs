//! Offset/limit pagination.
//!
//! Bounds are clamped, never rejected: a page below 1 is treated as page 1, a
//! non-positive size falls back to [`PageRequest::DEFAULT_SIZE`] and a size
//! above [`PageRequest::MAX_SIZE`] is cut down to it. The clamped size is what
//! the paging metadata reports.

use serde::{Deserialize, Serialize};

/// Normalised pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: Self::DEFAULT_SIZE,
        }
    }
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;
    /// Largest page a single search returns.
    pub const MAX_SIZE: u32 = 100;

    pub fn new(page: i64, size: i64) -> Self {
        let page = if page < 1 {
            1
        } else {
            page.min(u32::MAX as i64) as u32
        };
        let size = if size <= 0 {
            Self::DEFAULT_SIZE
        } else {
            size.min(Self::MAX_SIZE as i64) as u32
        };
        Self { page, size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rows to skip: `(page - 1) * size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// Paging metadata returned alongside search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page: u32,
    pub size: u32,
    pub total_item: u64,
    pub total_page: u64,
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn metadata(&self) -> PageMetadata {
        let size = u64::from(self.request.size());
        PageMetadata {
            page: self.request.page(),
            size: self.request.size(),
            total_item: self.total,
            total_page: self.total.div_ceil(size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_match_first_page_of_ten() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn oversized_pages_are_cut_to_the_maximum() {
        let req = PageRequest::new(1, 500);
        assert_eq!(req.size(), PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(3, 100).size(), 100);

        let page: Page<()> = Page::new(vec![], 250, req);
        assert_eq!(page.metadata().size, 100);
        assert_eq!(page.metadata().total_page, 3);
    }

    #[test]
    fn total_pages_round_up() {
        let page: Page<()> = Page::new(vec![], 21, PageRequest::new(1, 10));
        assert_eq!(page.metadata().total_page, 3);

        let empty: Page<()> = Page::new(vec![], 0, PageRequest::new(1, 10));
        assert_eq!(empty.metadata().total_page, 0);
    }

    proptest! {
        #[test]
        fn non_positive_page_behaves_like_page_one(page in i64::MIN..=0, size in 1i64..=100) {
            prop_assert_eq!(PageRequest::new(page, size), PageRequest::new(1, size));
        }

        #[test]
        fn non_positive_size_behaves_like_default(page in 1i64..1000, size in i64::MIN..=0) {
            prop_assert_eq!(
                PageRequest::new(page, size),
                PageRequest::new(page, PageRequest::DEFAULT_SIZE as i64)
            );
        }

        #[test]
        fn clamped_requests_stay_in_bounds(page in any::<i64>(), size in any::<i64>()) {
            let req = PageRequest::new(page, size);
            prop_assert!(req.page() >= 1);
            prop_assert!((1..=PageRequest::MAX_SIZE).contains(&req.size()));
        }
    }
}
