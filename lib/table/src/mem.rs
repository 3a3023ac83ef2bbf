//! In-memory implementation of [`TableStore`] for tests.
//!
//! Same filter/order/limit semantics as the REST store, backed by a
//! mutexed map of table name to row list.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::traits::{Filter, Op, Order, Query, TableStore};
use crate::TableError;

#[derive(Default)]
pub struct MemStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Value>>>, TableError> {
        self.tables
            .lock()
            .map_err(|e| TableError::Store(e.to_string()))
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| match f.op {
        Op::Eq => row.get(&f.column) == Some(&f.value),
        Op::Neq => row.get(&f.column) != Some(&f.value),
    })
}

/// Column ordering: numbers numerically, strings lexicographically
/// (RFC 3339 timestamps sort correctly that way).
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait::async_trait]
impl TableStore for MemStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, TableError> {
        let tables = self.lock()?;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches(r, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((col, dir)) = &query.order {
            let null = Value::Null;
            rows.sort_by(|a, b| {
                let cmp = value_cmp(a.get(col).unwrap_or(&null), b.get(col).unwrap_or(&null));
                match dir {
                    Order::Asc => cmp,
                    Order::Desc => cmp.reverse(),
                }
            });
        }
        if let Some(n) = query.limit {
            rows.truncate(n);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, TableError> {
        let mut tables = self.lock()?;
        let entries = tables.entry(table.to_string()).or_default();
        entries.extend(rows.iter().cloned());
        Ok(rows.to_vec())
    }

    async fn update(&self, table: &str, query: &Query, patch: &Value) -> Result<u64, TableError> {
        let patch_obj = patch
            .as_object()
            .ok_or_else(|| TableError::Store("update patch must be a JSON object".into()))?;

        let mut tables = self.lock()?;
        let mut affected = 0;
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut() {
                if !matches(row, &query.filters) {
                    continue;
                }
                if let Some(obj) = row.as_object_mut() {
                    for (k, v) in patch_obj {
                        obj.insert(k.clone(), v.clone());
                    }
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<u64, TableError> {
        let mut tables = self.lock()?;
        let mut deleted = 0;
        if let Some(rows) = tables.get_mut(table) {
            let before = rows.len();
            rows.retain(|r| !matches(r, &query.filters));
            deleted = (before - rows.len()) as u64;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_and_filtered_select() {
        let store = MemStore::new();
        store
            .insert(
                "codes",
                &[
                    json!({"code": "AAA", "speed": "16mbps", "status": "unused"}),
                    json!({"code": "BBB", "speed": "20mbps", "status": "unused"}),
                    json!({"code": "CCC", "speed": "16mbps", "status": "unused"}),
                ],
            )
            .await
            .unwrap();

        let q = Query::new().eq("speed", "16mbps").eq("status", "unused");
        let rows = store.select("codes", &q).await.unwrap();
        assert_eq!(rows.len(), 2);

        let empty = store.select("codes", &Query::new().eq("speed", "50mbps")).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn order_desc_and_limit() {
        let store = MemStore::new();
        store
            .insert(
                "history",
                &[
                    json!({"code": "A", "used_on": "2026-01-01T00:00:00Z"}),
                    json!({"code": "B", "used_on": "2026-03-01T00:00:00Z"}),
                    json!({"code": "C", "used_on": "2026-02-01T00:00:00Z"}),
                ],
            )
            .await
            .unwrap();

        let q = Query::new().order_desc("used_on").limit(2);
        let rows = store.select("history", &q).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["code"], "B");
        assert_eq!(rows[1]["code"], "C");
    }

    #[tokio::test]
    async fn update_patches_matching_rows() {
        let store = MemStore::new();
        store
            .insert("stats", &[json!({"id": 1, "codes_used": 4})])
            .await
            .unwrap();

        let n = store
            .update("stats", &Query::new().eq("id", 1), &json!({"codes_used": 5}))
            .await
            .unwrap();
        assert_eq!(n, 1);

        let rows = store.select("stats", &Query::new().eq("id", 1)).await.unwrap();
        assert_eq!(rows[0]["codes_used"], 5);
    }

    #[tokio::test]
    async fn delete_returns_count() {
        let store = MemStore::new();
        store
            .insert(
                "codes",
                &[
                    json!({"code": "AAA", "speed": "16mbps"}),
                    json!({"code": "AAA", "speed": "20mbps"}),
                ],
            )
            .await
            .unwrap();

        let n = store
            .delete("codes", &Query::new().eq("code", "AAA").eq("speed", "16mbps"))
            .await
            .unwrap();
        assert_eq!(n, 1);

        let n = store.delete("codes", &Query::new().eq("code", "ZZZ")).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn neq_matches_everything_else() {
        let store = MemStore::new();
        store
            .insert(
                "codes",
                &[json!({"code": "AAA"}), json!({"code": "BBB"})],
            )
            .await
            .unwrap();

        // The dialect's "delete all" spelling.
        let n = store.delete("codes", &Query::new().neq("id", 0)).await.unwrap();
        assert_eq!(n, 2);
        assert!(store.select("codes", &Query::new()).await.unwrap().is_empty());
    }
}
