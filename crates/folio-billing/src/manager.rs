//! Bill processing and totals.

use serde::Serialize;
use tracing::error;

use crate::bill::{Bill, BillType};
use crate::money::Money;
use crate::rates::ExchangeRateSource;

/// Totals over a set of processed bills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
    pub available: Money,
    pub total_income: Money,
    pub total_outlay: Money,
}

/// Holds processed bills, newest first.
#[derive(Debug, Default)]
pub struct BillManager {
    bills: Vec<Bill>,
}

impl BillManager {
    /// Take already processed bills and sort them by date, newest first.
    pub fn new(mut bills: Vec<Bill>) -> Self {
        bills.sort_by(|a, b| b.date.cmp(&a.date));
        Self { bills }
    }

    /// Fill in `exchanged-amount` and `target-unit` for every bill.
    ///
    /// Bills with an explicit `exchanged-amount` keep it. Otherwise the
    /// original amount is converted into the bill's target unit, falling
    /// back to `default_target`. A failed rate lookup is logged and treated
    /// as a rate of 1 so one bad currency never hides the rest.
    pub fn process_bills(
        raw: Vec<Bill>,
        default_target: &str,
        rates: &dyn ExchangeRateSource,
    ) -> Vec<Bill> {
        raw.into_iter()
            .map(|mut bill| {
                let target_unit = bill
                    .target_unit
                    .clone()
                    .filter(|unit| !unit.is_empty())
                    .unwrap_or_else(|| default_target.to_owned());

                if bill.exchanged_amount.is_none()
                    && let (Some(amount), Some(unit)) = (bill.original_amount, &bill.original_unit)
                    && amount != 0.0
                    && !unit.is_empty()
                {
                    let rate = lookup_rate(rates, unit, &target_unit);
                    bill.exchanged_amount = Some(Money::from_f64(amount).convert(rate).as_f64());
                }

                bill.exchanged_amount.get_or_insert(0.0);
                bill.target_unit = Some(target_unit);
                bill
            })
            .collect()
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    fn total(&self, kind: BillType) -> Money {
        self.bills
            .iter()
            .filter(|bill| bill.kind == kind)
            .map(Bill::amount)
            .sum()
    }

    pub fn incomes(&self) -> Money {
        self.total(BillType::Income)
    }

    pub fn outlays(&self) -> Money {
        self.total(BillType::Outlay)
    }

    pub fn available(&self) -> Money {
        self.incomes() - self.outlays()
    }

    pub fn summary(&self) -> BillSummary {
        let total_income = self.incomes();
        let total_outlay = self.outlays();
        BillSummary {
            available: total_income - total_outlay,
            total_income,
            total_outlay,
        }
    }
}

fn lookup_rate(rates: &dyn ExchangeRateSource, from: &str, to: &str) -> f64 {
    if from == to {
        return 1.0;
    }
    rates.rate(from, to).unwrap_or_else(|e| {
        error!(from, to, error = %e, "Failed to fetch exchange rate");
        1.0
    })
}

/// Narrow symbol for a currency code; unknown codes are returned as-is.
pub fn currency_symbol(code: &str) -> &str {
    match code.to_ascii_uppercase().as_str() {
        "USD" | "AUD" | "CAD" | "HKD" | "MXN" | "NZD" | "SGD" | "TWD" => "$",
        "CNY" | "JPY" => "¥",
        "EUR" => "€",
        "GBP" => "£",
        "KRW" => "₩",
        "INR" => "₹",
        "RUB" => "₽",
        "THB" => "฿",
        "VND" => "₫",
        "PHP" => "₱",
        "TRY" => "₺",
        "ILS" => "₪",
        "NGN" => "₦",
        "UAH" => "₴",
        "BRL" => "R$",
        "PLN" => "zł",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::tests::FakeRates;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn bill(date: &str, kind: BillType) -> Bill {
        Bill {
            date: date.parse::<NaiveDate>().unwrap(),
            original_amount: None,
            original_unit: None,
            exchanged_amount: None,
            target_unit: None,
            target: String::new(),
            operator: String::new(),
            description: String::new(),
            kind,
        }
    }

    fn foreign(date: &str, amount: f64, unit: &str) -> Bill {
        Bill {
            original_amount: Some(amount),
            original_unit: Some(unit.to_owned()),
            ..bill(date, BillType::Outlay)
        }
    }

    #[test]
    fn test_process_converts_original_amount() {
        let rates = FakeRates::new(&[("USD", "CNY", 7.2)]);

        let bills = BillManager::process_bills(vec![foreign("2024-01-01", 30.0, "USD")], "CNY", &rates);

        assert_eq!(bills[0].exchanged_amount, Some(216.0));
        assert_eq!(bills[0].target_unit.as_deref(), Some("CNY"));
    }

    #[test]
    fn test_process_keeps_explicit_amount() {
        let rates = FakeRates::new(&[]);
        let mut explicit = foreign("2024-01-01", 30.0, "USD");
        explicit.exchanged_amount = Some(200.0);

        let bills = BillManager::process_bills(vec![explicit], "CNY", &rates);

        assert_eq!(bills[0].exchanged_amount, Some(200.0));
        assert_eq!(rates.calls(), 0);
    }

    #[test]
    fn test_process_uses_bill_target_unit() {
        let rates = FakeRates::new(&[("USD", "EUR", 0.9)]);
        let mut to_euro = foreign("2024-01-01", 10.0, "USD");
        to_euro.target_unit = Some("EUR".to_owned());

        let bills = BillManager::process_bills(vec![to_euro], "CNY", &rates);

        assert_eq!(bills[0].exchanged_amount, Some(9.0));
        assert_eq!(bills[0].target_unit.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_process_same_currency_skips_lookup() {
        let rates = FakeRates::new(&[]);

        let bills = BillManager::process_bills(vec![foreign("2024-01-01", 12.5, "CNY")], "CNY", &rates);

        assert_eq!(bills[0].exchanged_amount, Some(12.5));
        assert_eq!(rates.calls(), 0);
    }

    #[test]
    #[traced_test]
    fn test_process_rate_failure_falls_back_to_one() {
        let rates = FakeRates::new(&[]);

        let bills = BillManager::process_bills(vec![foreign("2024-01-01", 30.0, "XYZ")], "CNY", &rates);

        assert_eq!(bills[0].exchanged_amount, Some(30.0));
        assert!(logs_contain("Failed to fetch exchange rate"));
    }

    #[test]
    fn test_process_missing_amounts_default_to_zero() {
        let rates = FakeRates::new(&[]);

        let bills = BillManager::process_bills(vec![bill("2024-01-01", BillType::Income)], "USD", &rates);

        assert_eq!(bills[0].exchanged_amount, Some(0.0));
        assert_eq!(bills[0].target_unit.as_deref(), Some("USD"));
    }

    #[test]
    fn test_new_sorts_newest_first() {
        let manager = BillManager::new(vec![
            bill("2024-01-01", BillType::Income),
            bill("2024-03-01", BillType::Income),
            bill("2024-02-01", BillType::Outlay),
        ]);

        let dates: Vec<String> = manager.bills().iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);
    }

    #[test]
    fn test_summary() {
        let amounts = [
            (BillType::Income, 216.35),
            (BillType::Income, 100.0),
            (BillType::Outlay, 50.1),
        ];
        let bills = amounts
            .iter()
            .map(|(kind, amount)| Bill {
                exchanged_amount: Some(*amount),
                ..bill("2024-01-01", *kind)
            })
            .collect();
        let manager = BillManager::new(bills);

        assert_eq!(
            manager.summary(),
            BillSummary {
                available: Money::from_cents(26_625),
                total_income: Money::from_cents(31_635),
                total_outlay: Money::from_cents(5_010),
            }
        );
        assert_eq!(manager.available(), Money::from_cents(26_625));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let manager = BillManager::default();
        assert_eq!(
            serde_json::to_string(&manager.summary()).unwrap(),
            r#"{"available":0.0,"totalIncome":0.0,"totalOutlay":0.0}"#
        );
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("cny"), "¥");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("XAU"), "XAU");
        assert_eq!(currency_symbol(""), "");
    }
}
