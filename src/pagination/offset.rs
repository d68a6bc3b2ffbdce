//! Offset pagination
//!
//! Socrata pages with `$limit` and `$offset`. Each response advances the
//! offset by the page size until the stop condition fires.

use super::types::{NextPage, PaginationState, StopCondition, StopResult};

/// Offset-based paginator
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Number of records per page
    pub limit_value: u32,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(limit_value: u32, stop_condition: StopCondition) -> Self {
        Self {
            limit_value,
            stop_condition,
        }
    }

    /// Record a page of `records_count` records and compute the next step
    pub fn process_page(&self, records_count: usize, state: &mut PaginationState) -> NextPage {
        state.add_page(records_count as u64);

        if self.stop_condition.check(records_count, state) == StopResult::Stop {
            return NextPage::Done;
        }

        state.add_offset(u64::from(self.limit_value));
        NextPage::Continue {
            offset: state.offset,
        }
    }
}
