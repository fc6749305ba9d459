//! Bill records as written in site data files.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Whether money came in or went out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    Income,
    Outlay,
}

/// A single transaction.
///
/// Amounts are plain decimals in the data file. `exchanged-amount` is in
/// `target-unit`; when it is missing it is computed from
/// `original-amount` in `original-unit` during processing.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Bill {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchanged_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_unit: Option<String>,
    /// Income source or outlay recipient.
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: BillType,
}

impl Bill {
    /// The settled amount, zero until processed.
    pub fn amount(&self) -> Money {
        self.exchanged_amount.map_or(Money::ZERO, Money::from_f64)
    }

    pub fn is_income(&self) -> bool {
        self.kind == BillType::Income
    }
}

/// Parse a JSON array of bills.
pub fn parse_bills(json: &str) -> Result<Vec<Bill>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_kebab_case_fields() {
        let bills = parse_bills(
            r#"[{
                "date": "2024-01-15",
                "original-amount": 30,
                "original-unit": "USD",
                "target": "Hosting",
                "operator": "ops",
                "description": "VPS",
                "type": "outlay"
            }]"#,
        )
        .unwrap();

        let bill = &bills[0];
        assert_eq!(bill.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bill.original_amount, Some(30.0));
        assert_eq!(bill.original_unit.as_deref(), Some("USD"));
        assert_eq!(bill.exchanged_amount, None);
        assert_eq!(bill.kind, BillType::Outlay);
        assert_eq!(bill.amount(), Money::ZERO);
    }

    #[test]
    fn test_parse_minimal_bill() {
        let bills =
            parse_bills(r#"[{"date": "2024-02-01", "exchanged-amount": 216.35, "type": "income"}]"#)
                .unwrap();

        assert!(bills[0].is_income());
        assert_eq!(bills[0].amount(), Money::from_cents(21635));
        assert_eq!(bills[0].target, "");
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert!(parse_bills(r#"[{"date": "15/01/2024", "type": "income"}]"#).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(parse_bills(r#"[{"date": "2024-01-15", "type": "refund"}]"#).is_err());
    }

    #[test]
    fn test_serialize_skips_missing_amounts() {
        let bill = Bill {
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            original_amount: None,
            original_unit: None,
            exchanged_amount: Some(1.5),
            target_unit: Some("CNY".to_owned()),
            target: "t".to_owned(),
            operator: "o".to_owned(),
            description: "d".to_owned(),
            kind: BillType::Income,
        };

        assert_eq!(
            serde_json::to_string(&bill).unwrap(),
            r#"{"date":"2024-03-09","exchanged-amount":1.5,"target-unit":"CNY","target":"t","operator":"o","description":"d","type":"income"}"#
        );
    }
}
