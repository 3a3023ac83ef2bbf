//! Repository operations over the remote tables.
//!
//! All persistence goes through [`TableStore`]; this layer owns the
//! mapping between wire rows and internal types, and the counter
//! bookkeeping. Nothing here
//! locks across calls: two sessions racing for the same code resolve
//! through the benign not-found result on the losing side.

pub mod dashboard;
pub mod issue;

use std::sync::Arc;

use lunarlink_core::{ServiceError, now_rfc3339};
use lunarlink_table::{Query, TableError, TableStore};
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::model::{
    Batch, BatchRow, Code, CodeRow, CodeStatus, Counter, Counters, HistoryEntry, HistoryRow,
    STATS_ROW_ID, SpeedTier, StatsRow,
};

pub(crate) const T_CODES: &str = "codes";
pub(crate) const T_HISTORY: &str = "history";
pub(crate) const T_BATCHES: &str = "batches";
pub(crate) const T_STATS: &str = "stats";

/// Query filters for the admin code listing.
#[derive(Debug, Default)]
pub struct CodeFilters {
    pub speed: Option<SpeedTier>,
    pub status: Option<CodeStatus>,
}

/// Query filters for the history view.
#[derive(Debug, Default)]
pub struct HistoryFilters {
    pub speed: Option<SpeedTier>,
    pub q: Option<String>,
}

/// Repository over the four remote tables.
pub struct CodeService {
    store: Arc<dyn TableStore>,
}

impl CodeService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    fn storage(e: TableError) -> ServiceError {
        ServiceError::Storage(e.to_string())
    }

    fn to_row<T: Serialize>(value: &T) -> Result<Value, ServiceError> {
        serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    fn rows_to<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ServiceError> {
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| ServiceError::Storage(format!("row decode: {}", e)))
            })
            .collect()
    }

    /// Create the counters singleton if the project is empty. Run once
    /// at startup.
    pub async fn ensure_counters(&self) -> Result<(), ServiceError> {
        let q = Query::new().eq("id", STATS_ROW_ID);
        let rows = self.store.select(T_STATS, &q).await.map_err(Self::storage)?;
        if rows.is_empty() {
            let mut row = StatsRow::zeroed();
            row.last_updated = Some(now_rfc3339());
            self.store
                .insert(T_STATS, &[Self::to_row(&row)?])
                .await
                .map_err(Self::storage)?;
            tracing::info!("created counters row");
        }
        Ok(())
    }

    // ── Pool reads ──

    /// All unused codes for a tier. An empty pool is `Ok(vec![])`; a
    /// failed fetch is an `Err`, so callers can tell the two apart.
    pub async fn list_unused(&self, tier: SpeedTier) -> Result<Vec<Code>, ServiceError> {
        let q = Query::new()
            .eq("speed", tier.as_str())
            .eq("status", CodeStatus::Unused.as_str());
        let rows = self.store.select(T_CODES, &q).await.map_err(Self::storage)?;
        Ok(Self::rows_to::<CodeRow>(rows)?.into_iter().map(Code::from).collect())
    }

    /// One unused code chosen uniformly at random from the tier's pool,
    /// or `None` when the pool is empty.
    pub async fn random_unused(&self, tier: SpeedTier) -> Result<Option<Code>, ServiceError> {
        let pool = self.list_unused(tier).await?;
        Ok(pool.choose(&mut rand::rng()).cloned())
    }

    /// Admin listing, newest upload first.
    pub async fn list_codes(&self, filters: &CodeFilters) -> Result<Vec<Code>, ServiceError> {
        let mut q = Query::new().order_desc("added_on");
        if let Some(speed) = filters.speed {
            q = q.eq("speed", speed.as_str());
        }
        if let Some(status) = filters.status {
            q = q.eq("status", status.as_str());
        }
        let rows = self.store.select(T_CODES, &q).await.map_err(Self::storage)?;
        Ok(Self::rows_to::<CodeRow>(rows)?.into_iter().map(Code::from).collect())
    }

    // ── Ingestion ──

    /// Bulk-ingest one upload: code rows, a batch row, and two counter
    /// bumps.
    ///
    /// Not transactional; these are independent remote calls. A
    /// failure after the codes insert leaves them in the pool with no
    /// batch row; the error is surfaced rather than rolled back, and
    /// the next dashboard read shows the drift.
    pub async fn insert_batch(
        &self,
        codes: &[String],
        batch_name: &str,
        tier: SpeedTier,
        allow_duplicate: bool,
    ) -> Result<usize, ServiceError> {
        let batch_name = batch_name.trim();
        if batch_name.is_empty() {
            return Err(ServiceError::Validation("batch name is required".into()));
        }
        if codes.is_empty() {
            return Err(ServiceError::Validation("no codes found in upload".into()));
        }

        // Same check the admin page did: name collision needs an
        // explicit go-ahead.
        if !allow_duplicate {
            let existing = self.batches(None).await?;
            if existing.iter().any(|b| b.name.eq_ignore_ascii_case(batch_name)) {
                return Err(ServiceError::Conflict(format!(
                    "batch '{}' already exists",
                    batch_name
                )));
            }
        }

        let now = now_rfc3339();
        let rows: Vec<Value> = codes
            .iter()
            .map(|code| {
                Self::to_row(&CodeRow {
                    id: None,
                    code: code.trim().to_string(),
                    speed: tier,
                    batch: batch_name.to_string(),
                    status: CodeStatus::Unused,
                    added_on: Some(now.clone()),
                })
            })
            .collect::<Result<_, _>>()?;

        let inserted = self.store.insert(T_CODES, &rows).await.map_err(Self::storage)?;

        let batch_row = BatchRow {
            batch_name: batch_name.to_string(),
            speed: tier,
            total_codes: codes.len() as u64,
            uploaded_on: Some(now),
        };
        self.store
            .insert(T_BATCHES, &[Self::to_row(&batch_row)?])
            .await
            .map_err(Self::storage)?;

        self.increment(Counter::TotalUploaded, codes.len() as u64).await?;
        self.increment(Counter::BatchesUploaded, 1).await?;

        tracing::info!(batch = batch_name, speed = tier.as_str(), count = inserted.len(), "batch ingested");
        Ok(inserted.len())
    }

    // ── Issuance mutations ──

    /// Move one unused code to history: insert the history entry,
    /// delete the pool row, bump used/accept counters. `Ok(false)`
    /// means no matching unused code exists: the benign already-gone
    /// case, never an error.
    pub async fn archive_code(&self, value: &str, tier: SpeedTier) -> Result<bool, ServiceError> {
        let q = Query::new()
            .eq("code", value)
            .eq("speed", tier.as_str())
            .eq("status", CodeStatus::Unused.as_str())
            .limit(1);
        let rows = self.store.select(T_CODES, &q).await.map_err(Self::storage)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(false);
        };
        let code: CodeRow = serde_json::from_value(row)
            .map_err(|e| ServiceError::Storage(format!("row decode: {}", e)))?;

        let entry = HistoryRow {
            code: code.code.clone(),
            speed: code.speed,
            batch: code.batch.clone(),
            used_on: Some(now_rfc3339()),
        };
        self.store
            .insert(T_HISTORY, &[Self::to_row(&entry)?])
            .await
            .map_err(Self::storage)?;

        let delete_q = match code.id {
            Some(id) => Query::new().eq("id", id),
            None => Query::new().eq("code", value).eq("speed", tier.as_str()),
        };
        self.store.delete(T_CODES, &delete_q).await.map_err(Self::storage)?;

        self.increment(Counter::CodesUsed, 1).await?;
        self.increment(Counter::Accepts, 1).await?;
        Ok(true)
    }

    /// Remove a rejected code from the pool and bump the reject
    /// counter. Best-effort: a failed delete of an already-rejected
    /// code is non-critical, so faults are logged, not propagated.
    pub async fn delete_code(&self, value: &str, tier: SpeedTier) {
        let q = Query::new().eq("code", value).eq("speed", tier.as_str());
        if let Err(e) = self.store.delete(T_CODES, &q).await {
            warn!(code = value, speed = tier.as_str(), "failed to delete rejected code: {}", e);
        }
        if let Err(e) = self.increment(Counter::Rejects, 1).await {
            warn!("failed to bump reject counter: {}", e);
        }
    }

    // ── Counters ──

    /// Read-modify-write bump of one counter column, stamping
    /// `last_updated`. No compare-and-swap: concurrent increments can
    /// lose updates, an accepted property at this tool's scale.
    pub async fn increment(&self, counter: Counter, delta: u64) -> Result<(), ServiceError> {
        let q = Query::new().eq("id", STATS_ROW_ID);
        let rows = self.store.select(T_STATS, &q).await.map_err(Self::storage)?;
        let Some(row) = rows.into_iter().next() else {
            return Err(ServiceError::Storage("counters row missing".into()));
        };
        let current = row.get(counter.column()).and_then(Value::as_u64).unwrap_or(0);
        let patch = serde_json::json!({
            counter.column(): current + delta,
            "last_updated": now_rfc3339(),
        });
        self.store.update(T_STATS, &q, &patch).await.map_err(Self::storage)?;
        Ok(())
    }

    /// Current counters. A missing singleton reads as zeroes; a failed
    /// fetch is an `Err`.
    pub async fn counters(&self) -> Result<Counters, ServiceError> {
        let q = Query::new().eq("id", STATS_ROW_ID);
        let rows = self.store.select(T_STATS, &q).await.map_err(Self::storage)?;
        match rows.into_iter().next() {
            Some(row) => serde_json::from_value::<StatsRow>(row)
                .map(Counters::from)
                .map_err(|e| ServiceError::Storage(format!("row decode: {}", e))),
            None => Ok(Counters::default()),
        }
    }

    // ── History and batches ──

    /// Usage log, newest first. `q` is a case-insensitive substring
    /// match on code or batch name, applied in-process because the
    /// table dialect has no pattern filter.
    pub async fn history(&self, filters: &HistoryFilters) -> Result<Vec<HistoryEntry>, ServiceError> {
        let mut q = Query::new().order_desc("used_on");
        if let Some(speed) = filters.speed {
            q = q.eq("speed", speed.as_str());
        }
        let rows = self.store.select(T_HISTORY, &q).await.map_err(Self::storage)?;
        let mut entries: Vec<HistoryEntry> = Self::rows_to::<HistoryRow>(rows)?
            .into_iter()
            .map(HistoryEntry::from)
            .collect();

        if let Some(needle) = &filters.q {
            let needle = needle.to_lowercase();
            entries.retain(|h| {
                h.code_value.to_lowercase().contains(&needle)
                    || h.batch_name.to_lowercase().contains(&needle)
            });
        }
        Ok(entries)
    }

    /// Upload batches, newest first.
    pub async fn batches(&self, limit: Option<usize>) -> Result<Vec<Batch>, ServiceError> {
        let mut q = Query::new().order_desc("uploaded_on");
        if let Some(n) = limit {
            q = q.limit(n);
        }
        let rows = self.store.select(T_BATCHES, &q).await.map_err(Self::storage)?;
        Ok(Self::rows_to::<BatchRow>(rows)?.into_iter().map(Batch::from).collect())
    }

    // ── Reset ──

    /// Delete every code, history entry and batch, and zero the
    /// counters. Irreversible; callers collect two explicit
    /// confirmations before invoking this.
    pub async fn clear_all(&self) -> Result<(), ServiceError> {
        // The dialect refuses unfiltered deletes; `id != 0` matches all.
        let all = Query::new().neq("id", 0);
        self.store.delete(T_CODES, &all).await.map_err(Self::storage)?;
        self.store.delete(T_HISTORY, &all).await.map_err(Self::storage)?;
        self.store.delete(T_BATCHES, &all).await.map_err(Self::storage)?;

        let patch = serde_json::json!({
            "total_codes_uploaded": 0,
            "codes_used": 0,
            "yes_clicks": 0,
            "no_clicks": 0,
            "batches_uploaded": 0,
            "last_updated": now_rfc3339(),
        });
        self.store
            .update(T_STATS, &Query::new().eq("id", STATS_ROW_ID), &patch)
            .await
            .map_err(Self::storage)?;

        tracing::info!("cleared all codes, history and batches");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunarlink_table::MemStore;

    async fn make_service() -> CodeService {
        let service = CodeService::new(Arc::new(MemStore::new()));
        service.ensure_counters().await.unwrap();
        service
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn insert_batch_populates_pool_and_counters() {
        let service = make_service().await;
        let n = service
            .insert_batch(&codes(&["AAA", "BBB", "CCC"]), "march-wave", SpeedTier::Mbps16, false)
            .await
            .unwrap();
        assert_eq!(n, 3);

        let pool = service.list_unused(SpeedTier::Mbps16).await.unwrap();
        assert_eq!(pool.len(), 3);
        assert!(pool.iter().all(|c| c.batch_name == "march-wave"));
        assert!(pool.iter().all(|c| c.added_on.is_some()));

        let batches = service.batches(None).await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].code_count, 3);

        let counters = service.counters().await.unwrap();
        assert_eq!(counters.total_uploaded, 3);
        assert_eq!(counters.batches_uploaded, 1);
        assert!(counters.last_updated.is_some());
    }

    #[tokio::test]
    async fn insert_batch_rejects_duplicate_name() {
        let service = make_service().await;
        service
            .insert_batch(&codes(&["AAA"]), "wave", SpeedTier::Mbps16, false)
            .await
            .unwrap();

        // Case-insensitive collision.
        let err = service
            .insert_batch(&codes(&["BBB"]), "WAVE", SpeedTier::Mbps20, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Explicit go-ahead records a second batch with the same name.
        service
            .insert_batch(&codes(&["BBB"]), "WAVE", SpeedTier::Mbps20, true)
            .await
            .unwrap();
        assert_eq!(service.batches(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_batch_validates_input() {
        let service = make_service().await;
        assert!(matches!(
            service.insert_batch(&[], "wave", SpeedTier::Mbps16, false).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.insert_batch(&codes(&["AAA"]), "  ", SpeedTier::Mbps16, false).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn archive_moves_code_to_history_once() {
        let service = make_service().await;
        service
            .insert_batch(&codes(&["AAA"]), "wave", SpeedTier::Mbps50, false)
            .await
            .unwrap();

        assert!(service.archive_code("AAA", SpeedTier::Mbps50).await.unwrap());
        assert!(service.list_unused(SpeedTier::Mbps50).await.unwrap().is_empty());

        let history = service.history(&HistoryFilters::default()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].code_value, "AAA");
        assert_eq!(history[0].batch_name, "wave");
        assert!(history[0].used_on.is_some());

        // Second archive of the same code: benign false, no duplicate
        // history entry.
        assert!(!service.archive_code("AAA", SpeedTier::Mbps50).await.unwrap());
        assert_eq!(service.history(&HistoryFilters::default()).await.unwrap().len(), 1);

        let counters = service.counters().await.unwrap();
        assert_eq!(counters.codes_used, 1);
        assert_eq!(counters.accept_count, 1);
    }

    #[tokio::test]
    async fn archive_respects_tier() {
        let service = make_service().await;
        service
            .insert_batch(&codes(&["AAA"]), "wave", SpeedTier::Mbps16, false)
            .await
            .unwrap();
        // Same value, wrong tier: nothing to archive.
        assert!(!service.archive_code("AAA", SpeedTier::Mbps50).await.unwrap());
        assert_eq!(service.list_unused(SpeedTier::Mbps16).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_code_removes_and_counts_reject() {
        let service = make_service().await;
        service
            .insert_batch(&codes(&["AAA", "BBB"]), "wave", SpeedTier::Mbps20, false)
            .await
            .unwrap();

        service.delete_code("AAA", SpeedTier::Mbps20).await;
        let pool = service.list_unused(SpeedTier::Mbps20).await.unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].value, "BBB");
        assert_eq!(service.counters().await.unwrap().reject_count, 1);

        // Deleting a code that is already gone still counts the reject.
        service.delete_code("AAA", SpeedTier::Mbps20).await;
        assert_eq!(service.counters().await.unwrap().reject_count, 2);
    }

    #[tokio::test]
    async fn random_unused_draws_from_pool() {
        let service = make_service().await;
        assert!(service.random_unused(SpeedTier::Mbps16).await.unwrap().is_none());

        service
            .insert_batch(&codes(&["AAA", "BBB", "CCC"]), "wave", SpeedTier::Mbps16, false)
            .await
            .unwrap();
        let drawn = service.random_unused(SpeedTier::Mbps16).await.unwrap().unwrap();
        assert!(["AAA", "BBB", "CCC"].contains(&drawn.value.as_str()));
    }

    #[tokio::test]
    async fn increment_requires_counters_row() {
        let service = CodeService::new(Arc::new(MemStore::new()));
        let err = service.increment(Counter::Accepts, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[tokio::test]
    async fn counters_default_when_row_missing() {
        let service = CodeService::new(Arc::new(MemStore::new()));
        assert_eq!(service.counters().await.unwrap(), Counters::default());
    }

    #[tokio::test]
    async fn history_filters_by_tier_and_search() {
        let service = make_service().await;
        service
            .insert_batch(&codes(&["AAA"]), "alpha", SpeedTier::Mbps16, false)
            .await
            .unwrap();
        service
            .insert_batch(&codes(&["BBB"]), "beta", SpeedTier::Mbps50, false)
            .await
            .unwrap();
        service.archive_code("AAA", SpeedTier::Mbps16).await.unwrap();
        service.archive_code("BBB", SpeedTier::Mbps50).await.unwrap();

        let by_tier = service
            .history(&HistoryFilters { speed: Some(SpeedTier::Mbps16), q: None })
            .await
            .unwrap();
        assert_eq!(by_tier.len(), 1);
        assert_eq!(by_tier[0].code_value, "AAA");

        let by_search = service
            .history(&HistoryFilters { speed: None, q: Some("BET".into()) })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].batch_name, "beta");
    }

    #[tokio::test]
    async fn clear_all_wipes_everything() {
        let service = make_service().await;
        service
            .insert_batch(&codes(&["AAA", "BBB"]), "wave", SpeedTier::Mbps16, false)
            .await
            .unwrap();
        service.archive_code("AAA", SpeedTier::Mbps16).await.unwrap();

        service.clear_all().await.unwrap();

        assert!(service.list_unused(SpeedTier::Mbps16).await.unwrap().is_empty());
        assert!(service.history(&HistoryFilters::default()).await.unwrap().is_empty());
        assert!(service.batches(None).await.unwrap().is_empty());

        let counters = service.counters().await.unwrap();
        assert_eq!(counters.total_uploaded, 0);
        assert_eq!(counters.accept_count, 0);
        assert!(counters.last_updated.is_some());
    }
}
