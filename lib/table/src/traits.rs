use serde_json::Value;

use crate::TableError;

/// Filter operator. The dialect needs only equality tests; `Neq` exists
/// because the service refuses unfiltered deletes, so "all rows" is
/// spelled `id != 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
}

/// One column filter.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A table query: column filters plus optional ordering and limit.
///
/// Built fluently:
///
/// ```ignore
/// let q = Query::new().eq("speed", "16mbps").eq("status", "unused").limit(1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<(String, Order)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column = value`.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op: Op::Eq,
            value: value.into(),
        });
        self
    }

    /// Require `column != value`.
    pub fn neq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op: Op::Neq,
            value: value.into(),
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some((column.to_string(), Order::Asc));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some((column.to_string(), Order::Desc));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Generic filter/insert/update/delete interface over named tables.
///
/// Services hold this as `Arc<dyn TableStore>` so production code and
/// tests differ only in construction.
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Rows matching the query.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, TableError>;

    /// Insert rows, returning their stored representations.
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, TableError>;

    /// Apply `patch` (an object of column → new value) to every row
    /// matching the query's filters. Returns the affected row count.
    async fn update(&self, table: &str, query: &Query, patch: &Value) -> Result<u64, TableError>;

    /// Delete every row matching the query's filters. Returns the
    /// deleted row count.
    async fn delete(&self, table: &str, query: &Query) -> Result<u64, TableError>;
}
