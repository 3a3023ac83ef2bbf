use serde::{Deserialize, Serialize};

use super::SpeedTier;

/// Alert severity. Critical means the tier is effectively out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// A low-stock warning for one tier, emitted when the unused count
/// crosses a threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub speed_tier: SpeedTier,

    /// Display label for the tier.
    pub label: String,

    /// Unused codes remaining.
    pub count: u64,

    pub level: AlertLevel,
}
