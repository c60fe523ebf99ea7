//! Client-side paging over an already filtered record set.

use crate::domain::payment::PaymentRecord;
use crate::error::{PaymentError, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// The page sizes offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn get(&self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PaymentError;

    fn try_from(value: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or_else(|| {
                PaymentError::Validation(format!(
                    "page size {value} is not supported (use 10, 20 or 50)"
                ))
            })
    }
}

impl FromStr for PageSize {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|_| PaymentError::Validation(format!("invalid page size '{s}'")))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Page position and size over a record sequence.
///
/// `current_page` is 1-based. Replacing the source does not clamp the
/// current page; explicit navigation always checks bounds.
#[derive(Debug, Clone)]
pub struct Paginator {
    records: Vec<PaymentRecord>,
    current_page: usize,
    page_size: PageSize,
}

impl Paginator {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            records: Vec::new(),
            current_page: 1,
            page_size,
        }
    }

    /// Replaces the backing sequence. The current page is left untouched.
    pub fn set_source(&mut self, records: Vec<PaymentRecord>) {
        self.records = records;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
    }

    /// Moves back to the first page unconditionally.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.records.len()
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size.get())
    }

    /// Page numbers `1..=total_pages`, for rendering a pager.
    pub fn pages(&self) -> RangeInclusive<usize> {
        1..=self.total_pages()
    }

    /// Records on the current page, or nothing if the page is out of range.
    pub fn slice(&self) -> &[PaymentRecord] {
        let size = self.page_size.get();
        let start = self.current_page.saturating_sub(1).saturating_mul(size);
        if start >= self.records.len() {
            return &[];
        }
        let end = (start + size).min(self.records.len());
        &self.records[start..end]
    }

    /// Jumps to `page` when it lies within `1..=total_pages`; otherwise a no-op.
    pub fn go_to_page(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
        }
    }

    pub fn next_page(&mut self) {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }
}
