//! Risk Scorer
//!
//! A supplier's tier is a monotonic step function of the sum of its risk
//! input columns: below 10 is low, below 20 moderate, below 30 high and
//! anything else dangerous. Rows with a missing or non-numeric input are
//! `unknown_risk`.

use super::record::SupplierRecord;
use super::{LoadError, LoadResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token that marks a column as a risk input when none are declared
pub const PRINCIPLE_TOKEN: &str = "PRINCIPLE";

/// Upper bounds (exclusive) for the low, moderate and high tiers
pub const LOW_RISK_BELOW: f64 = 10.0;
pub const MODERATE_RISK_BELOW: f64 = 20.0;
pub const HIGH_RISK_BELOW: f64 = 30.0;

/// ESG risk tier of a supplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "low_risk")]
    Low,
    #[serde(rename = "moderate_risk")]
    Moderate,
    #[serde(rename = "high_risk")]
    High,
    #[serde(rename = "dangerous_risk")]
    Dangerous,
    #[serde(rename = "unknown_risk")]
    Unknown,
}

impl RiskTier {
    /// Tier for a summed score. NaN has no tier.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            RiskTier::Unknown
        } else if score < LOW_RISK_BELOW {
            RiskTier::Low
        } else if score < MODERATE_RISK_BELOW {
            RiskTier::Moderate
        } else if score < HIGH_RISK_BELOW {
            RiskTier::High
        } else {
            RiskTier::Dangerous
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low_risk",
            RiskTier::Moderate => "moderate_risk",
            RiskTier::High => "high_risk",
            RiskTier::Dangerous => "dangerous_risk",
            RiskTier::Unknown => "unknown_risk",
        }
    }

    /// Human form, e.g. `High Risk`
    pub fn title(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
            RiskTier::Dangerous => "Dangerous Risk",
            RiskTier::Unknown => "Unknown Risk",
        }
    }

    /// High and dangerous suppliers raise a risk-flag alert
    pub fn is_flagged(&self) -> bool {
        matches!(self, RiskTier::High | RiskTier::Dangerous)
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low_risk" => Ok(RiskTier::Low),
            "moderate_risk" => Ok(RiskTier::Moderate),
            "high_risk" => Ok(RiskTier::High),
            "dangerous_risk" => Ok(RiskTier::Dangerous),
            "unknown_risk" => Ok(RiskTier::Unknown),
            other => Err(format!("unknown risk label '{}'", other)),
        }
    }
}

/// Columns that feed the risk score, resolved once per upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    columns: Vec<String>,
}

impl RiskInputs {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Every header containing `PRINCIPLE`, case-insensitively
    pub fn discover(headers: &[String]) -> LoadResult<Self> {
        let columns: Vec<String> = headers
            .iter()
            .filter(|h| h.to_uppercase().contains(PRINCIPLE_TOKEN))
            .cloned()
            .collect();

        if columns.is_empty() {
            return Err(LoadError::NoRiskInputs);
        }
        Ok(Self { columns })
    }

    /// An explicit declaration; every declared column must be present
    pub fn declared(declared: &[String], headers: &[String]) -> LoadResult<Self> {
        if declared.is_empty() {
            return Err(LoadError::NoRiskInputs);
        }
        for column in declared {
            if !headers.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn(column.clone()));
            }
        }
        Ok(Self {
            columns: declared.to_vec(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Sum of the risk inputs, `None` if any input is missing or non-numeric
    pub fn score(&self, record: &SupplierRecord) -> Option<f64> {
        self.columns
            .iter()
            .map(|column| record.get_f64(column))
            .sum()
    }

    pub fn tier(&self, record: &SupplierRecord) -> RiskTier {
        match self.score(record) {
            Some(score) => RiskTier::from_score(score),
            None => RiskTier::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::FieldValue;

    fn inputs() -> RiskInputs {
        RiskInputs::new(vec!["PRINCIPLE_1".to_string(), "PRINCIPLE_2".to_string()])
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(RiskTier::from_score(9.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(9.99), RiskTier::Low);
        assert_eq!(RiskTier::from_score(10.0), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(19.0), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(20.0), RiskTier::High);
        assert_eq!(RiskTier::from_score(29.0), RiskTier::High);
        assert_eq!(RiskTier::from_score(30.0), RiskTier::Dangerous);
        assert_eq!(RiskTier::from_score(-4.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(f64::NAN), RiskTier::Unknown);
    }

    #[test]
    fn test_tier_is_monotonic() {
        let mut previous = RiskTier::from_score(-1.0);
        for step in 0..400 {
            let tier = RiskTier::from_score(step as f64 * 0.1);
            assert!(tier >= previous, "tier dropped at {}", step);
            assert_ne!(tier, RiskTier::Unknown);
            previous = tier;
        }
    }

    #[test]
    fn test_scenario_scores() {
        let a = SupplierRecord::new("A")
            .with_field("PRINCIPLE_1", FieldValue::Integer(5))
            .with_field("PRINCIPLE_2", FieldValue::Integer(3));
        let b = SupplierRecord::new("B")
            .with_field("PRINCIPLE_1", FieldValue::Integer(15))
            .with_field("PRINCIPLE_2", FieldValue::Integer(10));

        assert_eq!(inputs().score(&a), Some(8.0));
        assert_eq!(inputs().tier(&a), RiskTier::Low);
        assert_eq!(inputs().score(&b), Some(25.0));
        assert_eq!(inputs().tier(&b), RiskTier::High);
    }

    #[test]
    fn test_missing_input_is_unknown() {
        let record = SupplierRecord::new("C")
            .with_field("PRINCIPLE_1", FieldValue::Integer(5))
            .with_field("PRINCIPLE_2", FieldValue::Null);
        assert_eq!(inputs().score(&record), None);
        assert_eq!(inputs().tier(&record), RiskTier::Unknown);

        let text = SupplierRecord::new("D")
            .with_field("PRINCIPLE_1", FieldValue::String("n/a".to_string()))
            .with_field("PRINCIPLE_2", FieldValue::Integer(1));
        assert_eq!(inputs().tier(&text), RiskTier::Unknown);
    }

    #[test]
    fn test_discover_is_case_insensitive() {
        let headers = vec![
            "id".to_string(),
            "Principle_1_Human_Rights".to_string(),
            "PRINCIPLE_10_ANTI_CORRUPTION".to_string(),
            "TREND_RRI".to_string(),
        ];
        let inputs = RiskInputs::discover(&headers).unwrap();
        assert_eq!(
            inputs.columns(),
            &["Principle_1_Human_Rights".to_string(), "PRINCIPLE_10_ANTI_CORRUPTION".to_string()]
        );
    }

    #[test]
    fn test_empty_selection_fails() {
        let headers = vec!["id".to_string(), "TREND_RRI".to_string()];
        assert!(matches!(RiskInputs::discover(&headers), Err(LoadError::NoRiskInputs)));
        assert!(matches!(RiskInputs::declared(&[], &headers), Err(LoadError::NoRiskInputs)));
    }

    #[test]
    fn test_declared_column_must_exist() {
        let headers = vec!["id".to_string(), "TREND_RRI".to_string()];
        let result = RiskInputs::declared(&["CURRENT_RRI".to_string()], &headers);
        assert!(matches!(result, Err(LoadError::MissingColumn(c)) if c == "CURRENT_RRI"));

        let ok = RiskInputs::declared(&["TREND_RRI".to_string()], &headers).unwrap();
        assert_eq!(ok.columns(), &["TREND_RRI".to_string()]);
    }

    #[test]
    fn test_label_round_trip() {
        for tier in [
            RiskTier::Low,
            RiskTier::Moderate,
            RiskTier::High,
            RiskTier::Dangerous,
            RiskTier::Unknown,
        ] {
            assert_eq!(tier.as_str().parse::<RiskTier>().unwrap(), tier);
        }
        assert!("catastrophic".parse::<RiskTier>().is_err());
        assert_eq!(RiskTier::Dangerous.title(), "Dangerous Risk");
    }
}
