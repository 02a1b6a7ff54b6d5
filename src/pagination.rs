use serde::{Deserialize, Serialize};

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

/// One page of results plus the numbers a client needs to walk the rest.
///
/// `page_size` is the number of elements actually on this page, not the
/// requested size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_pages: u32,
    pub total_elements: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub first_page: bool,
    pub last_page: bool,
    pub content: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size) as u32;

        Self {
            total_pages,
            total_elements,
            page_number: request.page,
            page_size: content.len() as u32,
            first_page: request.page == 0,
            last_page: request.page.saturating_add(1) >= total_pages,
            content,
        }
    }
}
