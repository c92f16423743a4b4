//! Page and size pagination primitives for marketplace list endpoints.
//!
//! List endpoints accept `page` and `size` query parameters. Both are
//! optional: a missing page defaults to the first page and a missing size
//! defaults to [`DEFAULT_PAGE_SIZE`]. Pages are one-based, so the first row
//! offset for page `n` is `(n - 1) * size`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page number used when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client omits `size`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// The page number was zero.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// The page size was zero or larger than [`MAX_PAGE_SIZE`].
    #[error("size must be between 1 and {max}")]
    SizeOutOfRange {
        /// Upper bound accepted for `size`.
        max: u32,
    },
}

/// Raw pagination query parameters as supplied by a client.
///
/// # Examples
///
/// ```
/// use pagination::{PageParams, PageRequest};
///
/// let params = PageParams { page: Some(3), size: None };
/// let request = PageRequest::try_from(params).unwrap_or_default();
/// assert_eq!(request.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// One-based page number.
    pub page: Option<u32>,
    /// Number of rows per page.
    pub size: Option<u32>,
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageParams", into = "PageParams")]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a validated request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` is zero or `size` falls outside
    /// `1..=MAX_PAGE_SIZE`.
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeOutOfRange { max: MAX_PAGE_SIZE });
        }
        Ok(Self { page, size })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Row limit as a signed integer suitable for SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Row offset suitable for SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }
}

impl TryFrom<PageParams> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: PageParams) -> Result<Self, Self::Error> {
        Self::new(
            value.page.unwrap_or(DEFAULT_PAGE),
            value.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

impl From<PageRequest> for PageParams {
    fn from(value: PageRequest) -> Self {
        Self {
            page: Some(value.page),
            size: Some(value.size),
        }
    }
}

/// One page of results plus the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
}

impl<T> Page<T> {
    /// Wrap `items` fetched for `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
        }
    }

    /// Map each item while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PageParams { page: None, size: None }, 1, 10, 0)]
    #[case(PageParams { page: Some(2), size: None }, 2, 10, 10)]
    #[case(PageParams { page: Some(4), size: Some(25) }, 4, 25, 75)]
    fn params_resolve_defaults_and_offsets(
        #[case] params: PageParams,
        #[case] page: u32,
        #[case] size: u32,
        #[case] offset: i64,
    ) {
        let request = PageRequest::try_from(params);
        assert_eq!(request.map(|r| (r.page(), r.size(), r.offset())), Ok((page, size, offset)));
    }

    #[rstest]
    #[case(PageParams { page: Some(0), size: None }, PageRequestError::PageOutOfRange)]
    #[case(PageParams { page: None, size: Some(0) }, PageRequestError::SizeOutOfRange { max: MAX_PAGE_SIZE })]
    #[case(PageParams { page: None, size: Some(MAX_PAGE_SIZE + 1) }, PageRequestError::SizeOutOfRange { max: MAX_PAGE_SIZE })]
    fn rejects_out_of_range_params(#[case] params: PageParams, #[case] expected: PageRequestError) {
        assert_eq!(PageRequest::try_from(params), Err(expected));
    }

    #[rstest]
    fn deserialises_from_query_shaped_json() {
        let parsed: Result<PageRequest, _> = serde_json::from_str(r#"{"page":3,"size":5}"#);
        assert_eq!(parsed.ok(), PageRequest::new(3, 5).ok());

        let invalid: Result<PageRequest, _> = serde_json::from_str(r#"{"page":0}"#);
        assert!(invalid.is_err());
    }

    #[rstest]
    fn page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2, 3], PageRequest::default()).map(|n| n * 2);
        assert_eq!(page.items, vec![2, 4, 6]);
        assert_eq!((page.page, page.size), (DEFAULT_PAGE, DEFAULT_PAGE_SIZE));
    }
}
