//! Validated search request parameters.

use thiserror::Error;

use super::Error;

/// Maximum keyword length in characters, after trimming.
pub const MAX_KEYWORD_CHARS: usize = 100;
/// Maximum page size accepted by the search operations.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Reasons a search request is rejected before any adapter or cache call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchQueryValidationError {
    /// Keyword is blank after trimming.
    #[error("keyword must not be empty")]
    EmptyKeyword,
    /// Keyword exceeds [`MAX_KEYWORD_CHARS`].
    #[error("keyword must be at most {max} characters, got {actual}")]
    KeywordTooLong {
        /// Allowed maximum.
        max: usize,
        /// Observed length.
        actual: usize,
    },
    /// Page numbers start at one.
    #[error("page must be at least 1")]
    InvalidPage,
    /// Page size is outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be between 1 and {max}, got {actual}")]
    InvalidPageSize {
        /// Allowed maximum.
        max: u32,
        /// Observed page size.
        actual: u32,
    },
}

impl SearchQueryValidationError {
    /// Request field the error refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyKeyword | Self::KeywordTooLong { .. } => "keyword",
            Self::InvalidPage => "page",
            Self::InvalidPageSize { .. } => "pageSize",
        }
    }
}

impl From<SearchQueryValidationError> for Error {
    fn from(value: SearchQueryValidationError) -> Self {
        Self::invalid_request(value.to_string()).for_field(value.field())
    }
}

/// A keyword search for one page of results.
///
/// ## Invariants
/// - `keyword` is trimmed and holds 1..=100 characters.
/// - `page >= 1` and `1 <= page_size <= 100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keyword: String,
    page: u32,
    page_size: u32,
}

impl SearchQuery {
    /// Validate and build a query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchQueryValidationError`] when any bound is violated.
    ///
    /// # Examples
    /// ```
    /// use account_search::domain::SearchQuery;
    ///
    /// let query = SearchQuery::new("  测试 ", 2, 10).expect("valid query");
    /// assert_eq!(query.keyword(), "测试");
    /// assert_eq!(query.offset(), 10);
    /// ```
    pub fn new(
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Self, SearchQueryValidationError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SearchQueryValidationError::EmptyKeyword);
        }
        let length = keyword.chars().count();
        if length > MAX_KEYWORD_CHARS {
            return Err(SearchQueryValidationError::KeywordTooLong {
                max: MAX_KEYWORD_CHARS,
                actual: length,
            });
        }
        if page == 0 {
            return Err(SearchQueryValidationError::InvalidPage);
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(SearchQueryValidationError::InvalidPageSize {
                max: MAX_PAGE_SIZE,
                actual: page_size,
            });
        }
        Ok(Self {
            keyword: keyword.to_owned(),
            page,
            page_size,
        })
    }

    /// Trimmed keyword.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// One-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of accounts per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first account on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Exclusive index of the last account on this page.
    pub fn end(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Whether `total` results extend past this page.
    pub fn has_more(&self, total: u64) -> bool {
        total > self.end()
    }
}
