//! Pagination module
//!
//! Offset pagination with an empty-page stop condition.
//!
//! # Overview
//!
//! The paginator turns "how many records did the last page hold" into either
//! the next offset to request or `Done`. Pagination ends only when a page
//! comes back empty; a short page is not treated as the last one.

mod offset;
mod types;

pub use offset::OffsetPaginator;
pub use types::{NextPage, PaginationState, StopCondition, StopResult};
