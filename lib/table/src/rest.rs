//! REST implementation of [`TableStore`].
//!
//! Speaks the hosted service's PostgREST dialect: equality filters as
//! `?col=eq.value`, ordering as `?order=col.desc`, and
//! `Prefer: return=representation` so mutations report affected rows.
//! The project API key rides on every request as both `apikey` and
//! bearer token.

use serde_json::Value;

use crate::traits::{Op, Order, Query, TableStore};
use crate::TableError;

/// Client for one hosted data project.
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// `base_url` is the REST root of the project, e.g.
    /// `https://xyz.example.co/rest/v1`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    /// Attach auth headers to a request.
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Parse a response, mapping HTTP errors to `TableError`.
    async fn parse_rows(resp: reqwest::Response) -> Result<Vec<Value>, TableError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TableError::Server { status: code, message: body });
        }
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| TableError::Decode(format!("response body: {}", e)))
    }
}

/// Render a filter value for the query string. Strings go bare
/// (`eq.unused`), everything else uses its JSON form (`eq.1`).
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build query-string pairs for a request. `with_shape` adds order and
/// limit; mutations send filters only.
fn query_pairs(query: &Query, with_shape: bool) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = query
        .filters
        .iter()
        .map(|f| {
            let op = match f.op {
                Op::Eq => "eq",
                Op::Neq => "neq",
            };
            (f.column.clone(), format!("{}.{}", op, render(&f.value)))
        })
        .collect();

    if with_shape {
        if let Some((col, dir)) = &query.order {
            let dir = match dir {
                Order::Asc => "asc",
                Order::Desc => "desc",
            };
            pairs.push(("order".to_string(), format!("{}.{}", col, dir)));
        }
        if let Some(n) = query.limit {
            pairs.push(("limit".to_string(), n.to_string()));
        }
    }

    pairs
}

#[async_trait::async_trait]
impl TableStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, TableError> {
        let req = self
            .http
            .get(self.table_url(table))
            .query(&query_pairs(query, true));
        let resp = self.authed(req).send().await?;
        Self::parse_rows(resp).await
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, TableError> {
        tracing::debug!(table, count = rows.len(), "insert rows");
        let req = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(rows);
        let resp = self.authed(req).send().await?;
        Self::parse_rows(resp).await
    }

    async fn update(&self, table: &str, query: &Query, patch: &Value) -> Result<u64, TableError> {
        let req = self
            .http
            .patch(self.table_url(table))
            .query(&query_pairs(query, false))
            .header("Prefer", "return=representation")
            .json(patch);
        let resp = self.authed(req).send().await?;
        let rows = Self::parse_rows(resp).await?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<u64, TableError> {
        tracing::debug!(table, "delete rows");
        let req = self
            .http
            .delete(self.table_url(table))
            .query(&query_pairs(query, false))
            .header("Prefer", "return=representation");
        let resp = self.authed(req).send().await?;
        let rows = Self::parse_rows(resp).await?;
        Ok(rows.len() as u64)
    }
}
