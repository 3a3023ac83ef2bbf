use serde::{Deserialize, Serialize};

use super::SpeedTier;

/// The archival record of one used code. Created exactly once, when a
/// code leaves the pool; immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The code that was handed out.
    pub code_value: String,

    pub speed_tier: SpeedTier,

    /// Batch the code originally arrived in.
    #[serde(default)]
    pub batch_name: String,

    /// When the code was used (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_on: Option<String>,
}

/// Wire row for the `history` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRow {
    pub code: String,
    pub speed: SpeedTier,
    #[serde(default)]
    pub batch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_on: Option<String>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            code_value: row.code,
            speed_tier: row.speed,
            batch_name: row.batch,
            used_on: row.used_on,
        }
    }
}

impl From<HistoryEntry> for HistoryRow {
    fn from(entry: HistoryEntry) -> Self {
        HistoryRow {
            code: entry.code_value,
            speed: entry.speed_tier,
            batch: entry.batch_name,
            used_on: entry.used_on,
        }
    }
}
