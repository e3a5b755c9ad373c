//! Paginated, sortable book listing for the client-side grid widget.
//!
//! The widget counts pages from 1, storage counts them from 0.

use bookshelf_kernel::settings::BookSettings;
use serde::{Deserialize, Serialize};

use super::error::BookError;
use super::models::Book;
use super::repository::{Direction, Page, PageRequest, Sort, SortField};

/// Query parameters sent by the grid widget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridParams {
    /// 1-based page number
    pub page: Option<i64>,
    /// Page size
    pub rows: Option<i64>,
    /// Sort field
    pub sidx: Option<String>,
    /// Sort order, `asc` or `desc`
    pub sord: Option<String>,
}

impl GridParams {
    /// Validate the parameters and build the storage page request.
    pub fn to_page_request(&self, limits: &BookSettings) -> Result<PageRequest, BookError> {
        let page = match self.page {
            Some(page) if page >= 1 => page as u64,
            Some(_) => return Err(BookError::invalid("page", "page must be at least 1")),
            None => return Err(BookError::invalid("page", "page is required")),
        };

        let size = match self.rows {
            None => limits.default_page_size,
            Some(rows) if rows >= 1 && rows as u64 <= limits.max_page_size => rows as u64,
            Some(_) => {
                return Err(BookError::invalid(
                    "rows",
                    format!("rows must be between 1 and {}", limits.max_page_size),
                ))
            }
        };

        let sort = match self.sidx.as_deref().map(str::trim) {
            Some(field) if !field.is_empty() => Some(Sort {
                field: field.parse::<SortField>()?,
                direction: Direction::parse_lenient(self.sord.as_deref()),
            }),
            _ => None,
        };

        // SQLite offsets are signed 64-bit.
        let index = page - 1;
        match index.checked_mul(size) {
            Some(offset) if offset <= i64::MAX as u64 => {}
            _ => return Err(BookError::invalid("page", "page is out of range")),
        }

        Ok(PageRequest {
            page: index,
            size,
            sort,
        })
    }
}

/// One grid page serialized for the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookGrid {
    /// 1-based page number
    pub current_page: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub rows: Vec<Book>,
}

impl From<Page<Book>> for BookGrid {
    fn from(page: Page<Book>) -> Self {
        Self {
            current_page: page.number + 1,
            total_pages: page.total_pages,
            total_records: page.total_elements,
            rows: page.content,
        }
    }
}
