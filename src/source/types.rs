//! Source types and traits

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;

/// A SoQL query without paging parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoqlQuery {
    /// Projected columns (`$select`)
    pub select: Vec<String>,
    /// Row filter (`$where`)
    pub filter: Option<String>,
    /// Grouping column (`$group`)
    pub group: Option<String>,
}

impl SoqlQuery {
    /// Create a query projecting the given columns
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            select: columns.into_iter().map(Into::into).collect(),
            filter: None,
            group: None,
        }
    }

    /// Set the grouping column
    #[must_use]
    pub fn with_group(mut self, column: impl Into<String>) -> Self {
        self.group = Some(column.into());
        self
    }

    /// Add a filter, AND-ed with any existing one
    #[must_use]
    pub fn with_filter(mut self, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        self.filter = Some(match self.filter.take() {
            Some(existing) => format!("({existing}) AND ({expr})"),
            None => expr,
        });
        self
    }

    /// `$select` clause, e.g. `nit_entidad, nombre_entidad`
    pub fn select_clause(&self) -> String {
        self.select.join(", ")
    }

    /// SoQL query parameters, excluding `$limit` and `$offset`
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("$select".to_string(), self.select_clause())];
        if let Some(filter) = &self.filter {
            params.push(("$where".to_string(), filter.clone()));
        }
        if let Some(group) = &self.group {
            params.push(("$group".to_string(), group.clone()));
        }
        params
    }
}

/// A remote tabular data source serving one page per call
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch up to `limit` records starting at `offset`
    ///
    /// An empty result means the data is exhausted.
    async fn fetch_page(&self, query: &SoqlQuery, limit: u32, offset: u64) -> Result<Vec<Record>>;
}
