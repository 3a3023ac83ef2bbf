use serde::{Deserialize, Serialize};

use super::SpeedTier;

/// Code status. Values are fixed by the external table contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    Unused,
    Used,
}

impl Default for CodeStatus {
    fn default() -> Self {
        Self::Unused
    }
}

impl CodeStatus {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeStatus::Unused => "unused",
            CodeStatus::Used => "used",
        }
    }
}

/// One single-use access code in the live pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    /// Remote row id, present once stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// The code string handed to the user.
    pub value: String,

    /// Bandwidth tier of this code.
    pub speed_tier: SpeedTier,

    /// Name of the batch this code arrived in.
    #[serde(default)]
    pub batch_name: String,

    #[serde(default)]
    pub status: CodeStatus,

    /// When the code was uploaded (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<String>,
}

/// Wire row for the `codes` table. Column names are the remote
/// service's snake_case contract; [`Code`] is the internal shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub code: String,
    pub speed: SpeedTier,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub status: CodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<String>,
}

impl From<CodeRow> for Code {
    fn from(row: CodeRow) -> Self {
        Code {
            id: row.id,
            value: row.code,
            speed_tier: row.speed,
            batch_name: row.batch,
            status: row.status,
            added_on: row.added_on,
        }
    }
}

impl From<Code> for CodeRow {
    fn from(code: Code) -> Self {
        CodeRow {
            id: code.id,
            code: code.value,
            speed: code.speed_tier,
            batch: code.batch_name,
            status: code.status,
            added_on: code.added_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_json_roundtrip() {
        let c = Code {
            id: Some(17),
            value: "WX7-P2K9".into(),
            speed_tier: SpeedTier::Mbps20,
            batch_name: "march-wave".into(),
            status: CodeStatus::Unused,
            added_on: Some("2026-03-01T08:00:00Z".into()),
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: Code = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn wire_mapping_uses_external_column_names() {
        let c = Code {
            id: None,
            value: "WX7-P2K9".into(),
            speed_tier: SpeedTier::Mbps16,
            batch_name: "march-wave".into(),
            status: CodeStatus::Unused,
            added_on: Some("2026-03-01T08:00:00Z".into()),
        };
        let row = serde_json::to_value(CodeRow::from(c.clone())).unwrap();
        assert_eq!(row["code"], "WX7-P2K9");
        assert_eq!(row["speed"], "16mbps");
        assert_eq!(row["batch"], "march-wave");
        assert_eq!(row["status"], "unused");
        assert_eq!(row["added_on"], "2026-03-01T08:00:00Z");

        let internal = serde_json::to_value(&c).unwrap();
        assert_eq!(internal["value"], "WX7-P2K9");
        assert_eq!(internal["speedTier"], "16mbps");
        assert_eq!(internal["batchName"], "march-wave");
        assert_eq!(internal["addedOn"], "2026-03-01T08:00:00Z");
    }

    #[test]
    fn wire_row_tolerates_unknown_columns() {
        let row: CodeRow = serde_json::from_value(serde_json::json!({
            "id": 3,
            "code": "AAA",
            "speed": "50mbps",
            "batch": "b1",
            "status": "unused",
            "added_on": "2026-01-01T00:00:00Z",
            "used_on": null
        }))
        .unwrap();
        assert_eq!(Code::from(row).value, "AAA");
    }
}
