//! Display windowing over a refined result set.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::core::PredictionResult;

/// Which slice of the refined set to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRequest {
    /// 1-based page number, clamped into range
    Page(usize),
    /// Bypass windowing
    All,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Page(1)
    }
}

/// One window of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub results: Vec<PredictionResult>,
    /// Effective (clamped) page number
    pub page_number: usize,
    /// `ceil(total_items / page_size)`; zero for an empty set
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub show_all: bool,
}

impl Page {
    pub fn has_next(&self) -> bool {
        !self.show_all && self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        !self.show_all && self.page_number > 1
    }
}

pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Clamp to `[1, total_pages]` (page 1 for an empty set)
pub fn clamp_page(page_number: usize, len: usize, page_size: NonZeroUsize) -> usize {
    page_number.clamp(1, total_pages(len, page_size).max(1))
}

/// Window `results` to the requested page
pub fn paginate(results: &[PredictionResult], page_size: NonZeroUsize, page_number: usize) -> Page {
    let page_number = clamp_page(page_number, results.len(), page_size);
    let start = (page_number - 1) * page_size.get();
    let end = (start + page_size.get()).min(results.len());

    Page {
        results: results.get(start..end).map(<[_]>::to_vec).unwrap_or_default(),
        page_number,
        total_pages: total_pages(results.len(), page_size),
        page_size: page_size.get(),
        total_items: results.len(),
        show_all: false,
    }
}

/// Whole set as a single window
pub fn show_all(results: &[PredictionResult], page_size: NonZeroUsize) -> Page {
    Page {
        results: results.to_vec(),
        page_number: 1,
        total_pages: total_pages(results.len(), page_size),
        page_size: page_size.get(),
        total_items: results.len(),
        show_all: true,
    }
}

pub fn apply(results: &[PredictionResult], page_size: NonZeroUsize, request: PageRequest) -> Page {
    match request {
        PageRequest::Page(n) => paginate(results, page_size, n),
        PageRequest::All => show_all(results, page_size),
    }
}
