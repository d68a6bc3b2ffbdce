//! Source extraction module
//!
//! Paginated extraction of SECOP records from a Socrata (SODA) endpoint.
//!
//! # Overview
//!
//! - `SoqlQuery` - column projection, `$where` filter and `$group` column
//! - `DataSource` - one page fetch; implemented by `SocrataSource` and by
//!   in-memory fakes in tests
//! - `Extractor` - drives a `DataSource` from offset 0 until an empty page

mod extractor;
mod socrata;
mod types;

pub use extractor::{Extraction, Extractor};
pub use socrata::SocrataSource;
pub use types::{DataSource, SoqlQuery};
