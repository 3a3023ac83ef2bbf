use serde::{Deserialize, Serialize};

use super::SpeedTier;

/// One upload operation's worth of codes. Append-only, kept for audit
/// and the recent-uploads view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Batch name as entered by the admin (e.g. "march-wave").
    pub name: String,

    pub speed_tier: SpeedTier,

    /// Number of codes ingested in this upload.
    #[serde(default)]
    pub code_count: u64,

    /// When the upload happened (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_on: Option<String>,
}

/// Wire row for the `batches` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchRow {
    pub batch_name: String,
    pub speed: SpeedTier,
    #[serde(default)]
    pub total_codes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_on: Option<String>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Batch {
            name: row.batch_name,
            speed_tier: row.speed,
            code_count: row.total_codes,
            uploaded_on: row.uploaded_on,
        }
    }
}

impl From<Batch> for BatchRow {
    fn from(batch: Batch) -> Self {
        BatchRow {
            batch_name: batch.name,
            speed: batch.speed_tier,
            total_codes: batch.code_count,
            uploaded_on: batch.uploaded_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_json_roundtrip() {
        let b = Batch {
            name: "march-wave".into(),
            speed_tier: SpeedTier::Mbps20,
            code_count: 120,
            uploaded_on: Some("2026-03-01T08:00:00Z".into()),
        };
        let json = serde_json::to_string(&b).unwrap();
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }

    #[test]
    fn wire_mapping() {
        let b = Batch {
            name: "april".into(),
            speed_tier: SpeedTier::Mbps50,
            code_count: 10,
            uploaded_on: None,
        };
        let row = serde_json::to_value(BatchRow::from(b)).unwrap();
        assert_eq!(row["batch_name"], "april");
        assert_eq!(row["speed"], "50mbps");
        assert_eq!(row["total_codes"], 10);
    }
}
