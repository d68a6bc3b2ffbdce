//! Paginated extractor
//!
//! Pulls every page of a query into memory. There is no retry: the first
//! failed page aborts the extraction.

use super::types::{DataSource, SoqlQuery};
use crate::error::Result;
use crate::pagination::{NextPage, OffsetPaginator, PaginationState, StopCondition};
use crate::types::Record;
use std::time::Instant;
use tracing::{debug, info};

/// Records accumulated by one extraction
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Records in extraction order
    pub records: Vec<Record>,
    /// Number of page requests issued, including the final empty one
    pub pages: u64,
}

/// Drives a `DataSource` through every page of a query
pub struct Extractor<'a> {
    source: &'a dyn DataSource,
    page_size: u32,
    filter: Option<String>,
    max_records: Option<u64>,
}

impl<'a> Extractor<'a> {
    /// Create an extractor with the given page size
    pub fn new(source: &'a dyn DataSource, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            filter: None,
            max_records: None,
        }
    }

    /// Attach a filter to every query
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Stop after this many records (sampling runs)
    #[must_use]
    pub fn with_max_records(mut self, max_records: Option<u64>) -> Self {
        self.max_records = max_records;
        self
    }

    /// Fetch all pages of `query`
    pub async fn extract(&self, query: &SoqlQuery) -> Result<Extraction> {
        let start = Instant::now();
        let query = match &self.filter {
            Some(filter) => query.clone().with_filter(filter.clone()),
            None => query.clone(),
        };

        let stop_condition = match self.max_records {
            Some(max) => StopCondition::MaxRecords(max),
            None => StopCondition::EmptyPage,
        };
        let paginator = OffsetPaginator::new(self.page_size, stop_condition);
        let mut state = PaginationState::new();
        let mut records = Vec::new();

        loop {
            let offset = state.offset;
            let page = self
                .source
                .fetch_page(&query, paginator.limit_value, offset)
                .await?;
            let count = page.len();
            debug!(
                select = %query.select_clause(),
                offset,
                count,
                "Fetched page"
            );
            records.extend(page);

            match paginator.process_page(count, &mut state) {
                NextPage::Continue { .. } => {}
                NextPage::Done => break,
            }
        }

        if let Some(max) = self.max_records {
            records.truncate(usize::try_from(max).unwrap_or(usize::MAX));
        }

        info!(
            "Extracted {} records in {} pages ({:?}) for [{}]",
            records.len(),
            state.pages,
            start.elapsed(),
            query.select_clause()
        );

        Ok(Extraction {
            records,
            pages: state.pages,
        })
    }
}
