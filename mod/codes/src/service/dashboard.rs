//! Read-only aggregates for the dashboard: per-tier pool counts,
//! usage rate and low-stock alerts. Nothing here is persisted; every
//! call recomputes from the repository.

use std::sync::Arc;

use lunarlink_core::ServiceError;
use serde::Serialize;

use super::CodeService;
use crate::model::{Alert, AlertLevel, Counters, SpeedTier};

pub const DEFAULT_WARNING_THRESHOLD: u64 = 5;
pub const DEFAULT_CRITICAL_THRESHOLD: u64 = 2;

/// Pool levels at which a tier starts alerting.
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub warning: u64,
    pub critical: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning: DEFAULT_WARNING_THRESHOLD,
            critical: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

/// Unused pool size for one tier.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierCount {
    pub speed_tier: SpeedTier,
    pub label: String,
    pub count: u64,
}

/// Everything the dashboard renders in one response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub tiers: Vec<TierCount>,
    pub counters: Counters,
    pub usage_rate: f64,
}

pub struct Dashboard {
    service: Arc<CodeService>,
    thresholds: AlertThresholds,
}

impl Dashboard {
    pub fn new(service: Arc<CodeService>, thresholds: AlertThresholds) -> Self {
        Self { service, thresholds }
    }

    /// Unused count per tier, in tier order. A failed read is an
    /// `Err`, never silently shown as zero.
    pub async fn unused_count_by_tier(&self) -> Result<Vec<TierCount>, ServiceError> {
        let mut tiers = Vec::with_capacity(SpeedTier::ALL.len());
        for tier in SpeedTier::ALL {
            let count = self.service.list_unused(tier).await?.len() as u64;
            tiers.push(TierCount {
                speed_tier: tier,
                label: tier.label().to_string(),
                count,
            });
        }
        Ok(tiers)
    }

    /// One alert per tier at or under a threshold. Critical wins when
    /// a count is under both lines.
    pub async fn alerts(&self) -> Result<Vec<Alert>, ServiceError> {
        let mut alerts = Vec::new();
        for tier_count in self.unused_count_by_tier().await? {
            let level = if tier_count.count <= self.thresholds.critical {
                Some(AlertLevel::Critical)
            } else if tier_count.count <= self.thresholds.warning {
                Some(AlertLevel::Warning)
            } else {
                None
            };
            if let Some(level) = level {
                alerts.push(Alert {
                    speed_tier: tier_count.speed_tier,
                    label: tier_count.label,
                    count: tier_count.count,
                    level,
                });
            }
        }
        Ok(alerts)
    }

    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let tiers = self.unused_count_by_tier().await?;
        let counters = self.service.counters().await?;
        let usage_rate = counters.usage_rate();
        Ok(DashboardSummary {
            tiers,
            counters,
            usage_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunarlink_table::MemStore;

    async fn seeded(tiers: &[(SpeedTier, usize)]) -> Dashboard {
        let service = Arc::new(CodeService::new(Arc::new(MemStore::new())));
        service.ensure_counters().await.unwrap();
        for (tier, n) in tiers {
            let codes: Vec<String> = (0..*n).map(|i| format!("{}-{}", tier.as_str(), i)).collect();
            service
                .insert_batch(&codes, &format!("seed-{}", tier.as_str()), *tier, false)
                .await
                .unwrap();
        }
        Dashboard::new(service, AlertThresholds::default())
    }

    #[tokio::test]
    async fn counts_follow_the_pools() {
        let dashboard = seeded(&[(SpeedTier::Mbps16, 3), (SpeedTier::Mbps50, 7)]).await;
        let tiers = dashboard.unused_count_by_tier().await.unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].count, 3);
        assert_eq!(tiers[1].count, 0);
        assert_eq!(tiers[2].count, 7);
        assert_eq!(tiers[0].label, "16 Mbps");
    }

    #[tokio::test]
    async fn alerts_level_per_tier() {
        let dashboard = seeded(&[
            (SpeedTier::Mbps16, 1),
            (SpeedTier::Mbps20, 4),
            (SpeedTier::Mbps50, 9),
        ])
        .await;
        let alerts = dashboard.alerts().await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].speed_tier, SpeedTier::Mbps16);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert_eq!(alerts[1].speed_tier, SpeedTier::Mbps20);
        assert_eq!(alerts[1].level, AlertLevel::Warning);
    }

    #[tokio::test]
    async fn empty_tier_is_critical() {
        let dashboard = seeded(&[(SpeedTier::Mbps16, 6)]).await;
        let alerts = dashboard.alerts().await.unwrap();
        // 20 and 50 Mbps pools hold nothing at all.
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.level == AlertLevel::Critical));
        assert!(alerts.iter().all(|a| a.count == 0));
    }

    #[tokio::test]
    async fn boundary_counts_take_the_tighter_level() {
        let dashboard = seeded(&[
            (SpeedTier::Mbps16, 2),
            (SpeedTier::Mbps20, 5),
            (SpeedTier::Mbps50, 6),
        ])
        .await;
        let alerts = dashboard.alerts().await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert_eq!(alerts[1].level, AlertLevel::Warning);
    }

    #[tokio::test]
    async fn custom_thresholds_apply() {
        let service = Arc::new(CodeService::new(Arc::new(MemStore::new())));
        service.ensure_counters().await.unwrap();
        let codes = vec!["AAA".to_string()];
        service.insert_batch(&codes, "seed", SpeedTier::Mbps16, false).await.unwrap();

        let dashboard = Dashboard::new(service, AlertThresholds { warning: 0, critical: 0 });
        let alerts = dashboard.alerts().await.unwrap();
        // Only the two genuinely empty tiers trip a zero threshold.
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.speed_tier != SpeedTier::Mbps16));
    }

    #[tokio::test]
    async fn summary_carries_counters_and_rate() {
        let service = Arc::new(CodeService::new(Arc::new(MemStore::new())));
        service.ensure_counters().await.unwrap();
        let codes = vec!["AAA".to_string(), "BBB".to_string()];
        service.insert_batch(&codes, "seed", SpeedTier::Mbps20, false).await.unwrap();
        service.archive_code("AAA", SpeedTier::Mbps20).await.unwrap();
        service.delete_code("BBB", SpeedTier::Mbps20).await;

        let dashboard = Dashboard::new(service, AlertThresholds::default());
        let summary = dashboard.summary().await.unwrap();
        assert_eq!(summary.counters.total_uploaded, 2);
        assert_eq!(summary.counters.codes_used, 1);
        assert_eq!(summary.usage_rate, 0.5);
        let tier = summary
            .tiers
            .iter()
            .find(|t| t.speed_tier == SpeedTier::Mbps20)
            .unwrap();
        assert_eq!(tier.count, 0);
    }

    #[tokio::test]
    async fn summary_with_no_activity_has_zero_rate() {
        let dashboard = seeded(&[]).await;
        let summary = dashboard.summary().await.unwrap();
        assert_eq!(summary.usage_rate, 0.0);
        assert_eq!(summary.counters.accept_count, 0);
        assert_eq!(summary.counters.reject_count, 0);
    }
}
