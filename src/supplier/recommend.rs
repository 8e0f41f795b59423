//! Alternative supplier recommendation for the Insights view

use super::record::{SupplierRecord, SupplierTable};
use super::risk::RiskTier;
use serde::Serialize;
use std::fmt;

/// Column used to judge how comparable two suppliers are
pub const COUNTRY_SECTOR_AVERAGE: &str = "COUNTRY_SECTOR_AVERAGE";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Alternative { id: String, risk: RiskTier },
    NoneFound,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Alternative { id, risk } => {
                write!(f, "Recommended alternative: Supplier ID {} (Risk: {})", id, risk)
            }
            Recommendation::NoneFound => write!(f, "No low-risk alternative suppliers found."),
        }
    }
}

/// The low-risk supplier whose country/sector average is closest to the
/// selected one. Candidates without a comparable average rank last; ties
/// keep table order. The selected supplier is never its own alternative.
pub fn recommend_alternative(table: &SupplierTable, selected: &SupplierRecord) -> Recommendation {
    let target = selected.get_f64(COUNTRY_SECTOR_AVERAGE);

    let distance = |row: &SupplierRecord| -> f64 {
        match (target, row.get_f64(COUNTRY_SECTOR_AVERAGE)) {
            (Some(a), Some(b)) => (a - b).abs(),
            _ => f64::INFINITY,
        }
    };

    table
        .rows()
        .iter()
        .filter(|row| row.predicted_risk == Some(RiskTier::Low) && row.id != selected.id)
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
        .map(|best| Recommendation::Alternative {
            id: best.id.clone(),
            risk: RiskTier::Low,
        })
        .unwrap_or(Recommendation::NoneFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::{FieldValue, RiskInputs};

    fn row(id: &str, risk: RiskTier, average: Option<f64>) -> SupplierRecord {
        let mut record = SupplierRecord::new(id);
        if let Some(avg) = average {
            record = record.with_field(COUNTRY_SECTOR_AVERAGE, FieldValue::Float(avg));
        }
        record.predicted_risk = Some(risk);
        record
    }

    fn table(rows: Vec<SupplierRecord>) -> SupplierTable {
        SupplierTable::new(
            vec!["id".to_string(), COUNTRY_SECTOR_AVERAGE.to_string()],
            rows,
            RiskInputs::new(vec!["PRINCIPLE_1".to_string()]),
        )
    }

    #[test]
    fn test_closest_low_risk_supplier_wins() {
        let t = table(vec![
            row("A", RiskTier::High, Some(50.0)),
            row("B", RiskTier::Low, Some(10.0)),
            row("C", RiskTier::Low, Some(45.0)),
            row("D", RiskTier::Moderate, Some(50.0)),
        ]);
        let rec = recommend_alternative(&t, &t.rows()[0]);
        assert_eq!(
            rec.to_string(),
            "Recommended alternative: Supplier ID C (Risk: low_risk)"
        );
    }

    #[test]
    fn test_missing_average_ranks_last() {
        let t = table(vec![
            row("A", RiskTier::High, Some(50.0)),
            row("B", RiskTier::Low, None),
            row("C", RiskTier::Low, Some(90.0)),
        ]);
        let rec = recommend_alternative(&t, &t.rows()[0]);
        assert_eq!(
            rec,
            Recommendation::Alternative {
                id: "C".to_string(),
                risk: RiskTier::Low
            }
        );
    }

    #[test]
    fn test_no_low_risk_alternative() {
        let t = table(vec![row("A", RiskTier::Low, Some(1.0)), row("B", RiskTier::High, Some(2.0))]);
        let rec = recommend_alternative(&t, &t.rows()[0]);
        assert_eq!(rec.to_string(), "No low-risk alternative suppliers found.");
    }
}
