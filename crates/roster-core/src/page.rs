//! Offset pagination for listings.

use serde::{Deserialize, Serialize};

/// Number of records per page when the caller does not ask otherwise.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Which slice of a listing to return. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:     u32,
  pub per_page: u32,
}

impl PageRequest {
  /// Build a request for `page`; `0` is clamped to the first page.
  pub fn new(page: u32) -> Self {
    Self { page: page.max(1), per_page: DEFAULT_PER_PAGE }
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.max(1) - 1) * u64::from(self.per_page)
  }

  pub fn limit(&self) -> u64 { u64::from(self.per_page) }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(1) }
}

/// One page of a listing plus the metadata needed to walk the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub current_page: u32,
  pub data:         Vec<T>,
  /// 1-based position of the first item on this page; `None` when empty.
  pub from:         Option<u64>,
  pub last_page:    u64,
  pub per_page:     u32,
  /// 1-based position of the last item on this page; `None` when empty.
  pub to:           Option<u64>,
  pub total:        u64,
}

impl<T> Page<T> {
  pub fn new(request: PageRequest, data: Vec<T>, total: u64) -> Self {
    let per_page = u64::from(request.per_page.max(1));
    let (from, to) = if data.is_empty() {
      (None, None)
    } else {
      let first = request.offset() + 1;
      (Some(first), Some(first + data.len() as u64 - 1))
    };

    Self {
      current_page: request.page.max(1),
      data,
      from,
      last_page: total.div_ceil(per_page).max(1),
      per_page: request.per_page,
      to,
      total,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_page_of_twenty() {
    let page = Page::new(PageRequest::new(1), (1..=15).collect(), 20);
    assert_eq!(page.from, Some(1));
    assert_eq!(page.to, Some(15));
    assert_eq!(page.last_page, 2);
    assert_eq!(page.per_page, 15);
  }

  #[test]
  fn second_page_is_partial() {
    let req = PageRequest::new(2);
    assert_eq!(req.offset(), 15);
    let page = Page::new(req, (16..=20).collect(), 20);
    assert_eq!(page.from, Some(16));
    assert_eq!(page.to, Some(20));
  }

  #[test]
  fn empty_listing_still_has_one_page() {
    let page: Page<u8> = Page::new(PageRequest::new(3), vec![], 0);
    assert_eq!(page.last_page, 1);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.from, None);
    assert_eq!(page.to, None);
  }

  #[test]
  fn page_zero_is_the_first_page() {
    assert_eq!(PageRequest::new(0), PageRequest::new(1));
  }
}
