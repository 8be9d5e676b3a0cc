use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::core::PredictionResult;
use crate::pagination::{self, Page, PageRequest};
use crate::refine::{refine, RefineFilter};

/// Snapshot handed to presentation and report collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    #[serde(flatten)]
    pub page: Page,
    pub total_matched: usize,
    pub total_after_refinement: usize,
    pub filter: RefineFilter,
}

/// Refinement and pagination state over one cached, ranked result set.
///
/// The full set is never re-queried: filters narrow it, clearing them
/// restores it in its original order.
#[derive(Debug, Clone)]
pub struct ResultView {
    full: Vec<PredictionResult>,
    refined: Vec<PredictionResult>,
    filter: RefineFilter,
    page_size: NonZeroUsize,
    request: PageRequest,
}

impl ResultView {
    pub fn new(full: Vec<PredictionResult>, page_size: NonZeroUsize) -> Self {
        Self {
            refined: full.clone(),
            full,
            filter: RefineFilter::default(),
            page_size,
            request: PageRequest::default(),
        }
    }

    pub fn filter(&self) -> &RefineFilter {
        &self.filter
    }

    pub fn total_matched(&self) -> usize {
        self.full.len()
    }

    pub fn total_after_refinement(&self) -> usize {
        self.refined.len()
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.refined.len(), self.page_size)
    }

    /// Replace the refinement terms. A changed filter returns to page 1.
    pub fn set_filter(&mut self, filter: RefineFilter) {
        if filter == self.filter {
            return;
        }
        self.refined = refine(&self.full, &filter);
        self.filter = filter;
        if let PageRequest::Page(_) = self.request {
            self.request = PageRequest::Page(1);
        }
        tracing::debug!(
            "Refined {} results down to {}",
            self.full.len(),
            self.refined.len()
        );
    }

    pub fn set_institute_filter(&mut self, term: &str) {
        let filter = RefineFilter::new(Some(term), self.filter.program.as_deref());
        self.set_filter(filter);
    }

    pub fn set_program_filter(&mut self, term: &str) {
        let filter = RefineFilter::new(self.filter.institute.as_deref(), Some(term));
        self.set_filter(filter);
    }

    pub fn clear_filters(&mut self) {
        self.set_filter(RefineFilter::default());
    }

    /// Jump to a page; leaves "show all" mode
    pub fn go_to_page(&mut self, page_number: usize) {
        let clamped = pagination::clamp_page(page_number, self.refined.len(), self.page_size);
        self.request = PageRequest::Page(clamped);
    }

    pub fn next_page(&mut self) {
        let current = self.current_page_number();
        self.go_to_page(current + 1);
    }

    pub fn previous_page(&mut self) {
        let current = self.current_page_number();
        self.go_to_page(current.saturating_sub(1));
    }

    pub fn set_show_all(&mut self, show_all: bool) {
        self.request = if show_all {
            PageRequest::All
        } else {
            PageRequest::Page(1)
        };
    }

    pub fn apply(&mut self, request: PageRequest) {
        match request {
            PageRequest::Page(n) => self.go_to_page(n),
            PageRequest::All => self.set_show_all(true),
        }
    }

    pub fn current_page_number(&self) -> usize {
        match self.request {
            PageRequest::Page(n) => n,
            PageRequest::All => 1,
        }
    }

    pub fn current(&self) -> ResultPage {
        ResultPage {
            page: pagination::apply(&self.refined, self.page_size, self.request),
            total_matched: self.full.len(),
            total_after_refinement: self.refined.len(),
            filter: self.filter.clone(),
        }
    }
}
