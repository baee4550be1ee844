//! Abstractions for page-number pagination.

use derive_more::Display;

/// Arguments selecting a single page of a paginated listing.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("page {page} ({per_page} per page)")]
pub struct Arguments {
    /// Number of the page, starting from `1`.
    pub page: u32,

    /// Maximum number of items on the page.
    pub per_page: u32,
}

/// Bounds of a paginated scan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Number of items requested per page.
    pub per_page: u32,

    /// Maximum number of pages to scan.
    pub max_pages: u32,
}

impl Limits {
    /// Returns the number of pages to scan for `total` items.
    ///
    /// Equals `ceil(total / per_page)` capped by [`Limits::max_pages`], so
    /// listings larger than `per_page * max_pages` are scanned only
    /// partially. Zero `per_page` yields zero pages.
    #[must_use]
    pub fn page_count(&self, total: u64) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let pages = total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages)
            .unwrap_or(u32::MAX)
            .min(self.max_pages)
    }

    /// Returns [`Arguments`] of every page to scan for `total` items, in
    /// order.
    pub fn pages(&self, total: u64) -> impl Iterator<Item = Arguments> {
        let per_page = self.per_page;
        (1..=self.page_count(total))
            .map(move |page| Arguments { page, per_page })
    }
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Limits};

    const LIMITS: Limits = Limits {
        per_page: 100,
        max_pages: 9,
    };

    #[test]
    fn page_count() {
        assert_eq!(LIMITS.page_count(0), 0);
        assert_eq!(LIMITS.page_count(1), 1);
        assert_eq!(LIMITS.page_count(5), 1);
        assert_eq!(LIMITS.page_count(100), 1);
        assert_eq!(LIMITS.page_count(101), 2);
        assert_eq!(LIMITS.page_count(850), 9);
    }

    #[test]
    fn page_count_is_capped() {
        assert_eq!(LIMITS.page_count(900), 9);
        assert_eq!(LIMITS.page_count(1000), 9);
        assert_eq!(LIMITS.page_count(u64::MAX), 9);

        let uncapped = Limits {
            per_page: 1,
            max_pages: u32::MAX,
        };
        assert_eq!(uncapped.page_count(u64::MAX), u32::MAX);
    }

    #[test]
    fn zero_per_page_scans_nothing() {
        let limits = Limits {
            per_page: 0,
            max_pages: 9,
        };
        assert_eq!(limits.page_count(1000), 0);
        assert_eq!(limits.pages(1000).count(), 0);
    }

    #[test]
    fn pages_are_one_indexed() {
        assert_eq!(
            LIMITS.pages(250).collect::<Vec<_>>(),
            vec![
                Arguments {
                    page: 1,
                    per_page: 100,
                },
                Arguments {
                    page: 2,
                    per_page: 100,
                },
                Arguments {
                    page: 3,
                    per_page: 100,
                },
            ],
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            Arguments {
                page: 2,
                per_page: 100,
            }
            .to_string(),
            "page 2 (100 per page)",
        );
    }
}
