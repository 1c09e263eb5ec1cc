use std::fmt;

/// Lower bound (inclusive) of the Medium band, in millimeters.
pub const MEDIUM_RISK_MM: f64 = 100.0;
/// Lower bound (inclusive) of the High band, in millimeters.
pub const HIGH_RISK_MM: f64 = 200.0;

/// One monthly rainfall observation, tagged with the region of its source file.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub region: String,
    pub year: i32,
    pub month: u32,
    pub rainfall_mm: f64,
}

/// Yearly flood-incident count for a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodRecord {
    pub year: i32,
    pub region: String,
    pub incident_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `< 100` is Low, `100..200` is Medium, `>= 200` is High.
    pub fn classify(predicted_mm: f64) -> Self {
        if predicted_mm < MEDIUM_RISK_MM {
            RiskLevel::Low
        } else if predicted_mm < HIGH_RISK_MM {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub year: i32,
    pub month: u32,
    pub region: String,
    pub predicted_rainfall_mm: f64,
    pub risk_level: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_band_boundaries() {
        assert_eq!(RiskLevel::classify(99.9), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(100.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(199.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(200.0), RiskLevel::High);
    }

    #[test]
    fn test_classify_negative_and_large_values() {
        assert_eq!(RiskLevel::classify(-42.0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(10_000.0), RiskLevel::High);
    }

    #[test]
    fn test_risk_levels_order_by_severity() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "High");
    }
}
