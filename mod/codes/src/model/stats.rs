use serde::{Deserialize, Serialize};

/// The singleton counters row lives at this wire id.
pub const STATS_ROW_ID: i64 = 1;

/// The individual counter fields. Each maps to one column of the
/// `stats` table; increments touch exactly one column at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    TotalUploaded,
    CodesUsed,
    Accepts,
    Rejects,
    BatchesUploaded,
}

impl Counter {
    /// Wire column name.
    pub fn column(&self) -> &'static str {
        match self {
            Counter::TotalUploaded => "total_codes_uploaded",
            Counter::CodesUsed => "codes_used",
            Counter::Accepts => "yes_clicks",
            Counter::Rejects => "no_clicks",
            Counter::BatchesUploaded => "batches_uploaded",
        }
    }
}

/// Derived aggregate summary of uploads and usage.
///
/// Eventually consistent with the source tables: updated by point
/// increments alongside each mutation, never recomputed, so the two can
/// drift when an increment step fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    /// Codes ever ingested.
    #[serde(default)]
    pub total_uploaded: u64,

    /// Codes archived to history.
    #[serde(default)]
    pub codes_used: u64,

    /// Accept decisions.
    #[serde(default)]
    pub accept_count: u64,

    /// Reject decisions.
    #[serde(default)]
    pub reject_count: u64,

    #[serde(default)]
    pub batches_uploaded: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Counters {
    /// Share of decisions that were accepts, in `0.0..=1.0`.
    /// Zero decisions means 0.0, not NaN.
    pub fn usage_rate(&self) -> f64 {
        let total = self.accept_count + self.reject_count;
        if total == 0 {
            return 0.0;
        }
        self.accept_count as f64 / total as f64
    }
}

/// Wire row for the `stats` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsRow {
    pub id: i64,
    #[serde(default)]
    pub total_codes_uploaded: u64,
    #[serde(default)]
    pub codes_used: u64,
    #[serde(default)]
    pub yes_clicks: u64,
    #[serde(default)]
    pub no_clicks: u64,
    #[serde(default)]
    pub batches_uploaded: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl StatsRow {
    /// A zeroed singleton row, for first boot against an empty project.
    pub fn zeroed() -> Self {
        StatsRow {
            id: STATS_ROW_ID,
            total_codes_uploaded: 0,
            codes_used: 0,
            yes_clicks: 0,
            no_clicks: 0,
            batches_uploaded: 0,
            last_updated: None,
        }
    }
}

impl From<StatsRow> for Counters {
    fn from(row: StatsRow) -> Self {
        Counters {
            total_uploaded: row.total_codes_uploaded,
            codes_used: row.codes_used,
            accept_count: row.yes_clicks,
            reject_count: row.no_clicks,
            batches_uploaded: row.batches_uploaded,
            last_updated: row.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_json_roundtrip() {
        let c = Counters {
            total_uploaded: 500,
            codes_used: 120,
            accept_count: 120,
            reject_count: 30,
            batches_uploaded: 4,
            last_updated: Some("2026-03-02T10:30:00Z".into()),
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: Counters = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn usage_rate_zero_denominator() {
        assert_eq!(Counters::default().usage_rate(), 0.0);
    }

    #[test]
    fn usage_rate_fraction() {
        let c = Counters {
            accept_count: 3,
            reject_count: 1,
            ..Default::default()
        };
        assert_eq!(c.usage_rate(), 0.75);
    }

    #[test]
    fn counter_columns_match_wire_contract() {
        assert_eq!(Counter::TotalUploaded.column(), "total_codes_uploaded");
        assert_eq!(Counter::Accepts.column(), "yes_clicks");
        assert_eq!(Counter::Rejects.column(), "no_clicks");
    }

    #[test]
    fn stats_row_maps_to_counters() {
        let row = StatsRow {
            id: STATS_ROW_ID,
            total_codes_uploaded: 10,
            codes_used: 2,
            yes_clicks: 2,
            no_clicks: 5,
            batches_uploaded: 1,
            last_updated: None,
        };
        let c = Counters::from(row);
        assert_eq!(c.total_uploaded, 10);
        assert_eq!(c.accept_count, 2);
        assert_eq!(c.reject_count, 5);
    }
}
