//! Pagination types
//!
//! Defines the state and results shared by the paginator and extractor.

/// Result of the next page computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// More pages may be available starting at this offset
    Continue {
        /// Offset of the next request
        offset: u64,
    },
    /// No more pages
    Done,
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopCondition {
    /// Stop when a page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop once this many records have been fetched
    MaxRecords(u64),
}

impl StopCondition {
    /// Check the condition against the latest page
    pub fn check(&self, records_count: usize, state: &PaginationState) -> StopResult {
        match self {
            StopCondition::EmptyPage => {
                if records_count == 0 {
                    StopResult::Stop
                } else {
                    StopResult::Continue
                }
            }
            StopCondition::MaxRecords(max) => {
                if records_count == 0 || state.total_fetched >= *max {
                    StopResult::Stop
                } else {
                    StopResult::Continue
                }
            }
        }
    }
}

/// Result of checking a stop condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Offset of the next request
    pub offset: u64,
    /// Number of requests issued so far
    pub pages: u64,
    /// Total records fetched so far
    pub total_fetched: u64,
}

impl PaginationState {
    /// Create a new pagination state at offset 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the offset
    pub fn add_offset(&mut self, amount: u64) {
        self.offset += amount;
    }

    /// Record one request returning `count` records
    pub fn add_page(&mut self, count: u64) {
        self.pages += 1;
        self.total_fetched += count;
    }
}
