use std::fmt;
use std::str::FromStr;

use lunarlink_core::ServiceError;
use serde::{Deserialize, Serialize};

/// The fixed bandwidth categories codes are grouped by.
///
/// The wire values (`16mbps`, ...) are part of the external table
/// contract and never change; labels are for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedTier {
    #[serde(rename = "16mbps")]
    Mbps16,
    #[serde(rename = "20mbps")]
    Mbps20,
    #[serde(rename = "50mbps")]
    Mbps50,
}

impl SpeedTier {
    pub const ALL: [SpeedTier; 3] = [SpeedTier::Mbps16, SpeedTier::Mbps20, SpeedTier::Mbps50];

    /// Wire value, e.g. `16mbps`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedTier::Mbps16 => "16mbps",
            SpeedTier::Mbps20 => "20mbps",
            SpeedTier::Mbps50 => "50mbps",
        }
    }

    /// Display label, e.g. `16 Mbps`.
    pub fn label(&self) -> &'static str {
        match self {
            SpeedTier::Mbps16 => "16 Mbps",
            SpeedTier::Mbps20 => "20 Mbps",
            SpeedTier::Mbps50 => "50 Mbps",
        }
    }
}

impl fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeedTier {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "16mbps" => Ok(SpeedTier::Mbps16),
            "20mbps" => Ok(SpeedTier::Mbps20),
            "50mbps" => Ok(SpeedTier::Mbps50),
            other => Err(ServiceError::Validation(format!(
                "unknown speed tier '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_wire_values() {
        assert_eq!(SpeedTier::Mbps16.as_str(), "16mbps");
        assert_eq!(SpeedTier::Mbps50.label(), "50 Mbps");
        assert_eq!(serde_json::to_string(&SpeedTier::Mbps20).unwrap(), "\"20mbps\"");
    }

    #[test]
    fn tier_from_str() {
        assert_eq!("16mbps".parse::<SpeedTier>().unwrap(), SpeedTier::Mbps16);
        assert_eq!(" 50MBPS ".parse::<SpeedTier>().unwrap(), SpeedTier::Mbps50);
        assert!("100mbps".parse::<SpeedTier>().is_err());
    }
}
