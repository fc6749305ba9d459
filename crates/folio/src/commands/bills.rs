//! `folio bills` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use folio_billing::rates::{FrankfurterClient, RateCache, RetryPolicy, Retrying};
use folio_billing::{
    Bill, BillManager, ExchangeRateSource, RateError, currency_symbol, format_money, parse_bills,
};
use folio_config::{BillingConfig, CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the bills command.
#[derive(Args)]
pub(crate) struct BillsArgs {
    /// Path to the bills JSON file.
    bills_file: PathBuf,

    /// Currency to convert into (overrides config).
    #[arg(long)]
    currency: Option<String>,

    /// Exchange-rate service URL (overrides config).
    #[arg(long, env = "FOLIO_RATES_URL")]
    rates_url: Option<String>,

    /// Do not fetch rates; bills without an exchanged amount use rate 1.
    #[arg(long)]
    offline: bool,

    /// Print processed bills and summary as JSON.
    #[arg(long)]
    json: bool,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl BillsArgs {
    /// Execute the bills command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or bill file cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            default_currency: self.currency,
            rates_url: self.rates_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let billing = &config.billing;

        let raw = parse_bills(&std::fs::read_to_string(&self.bills_file)?)?;
        tracing::debug!(
            file = %self.bills_file.display(),
            count = raw.len(),
            offline = self.offline,
            "Loaded bills"
        );
        output.info(&format!(
            "Processing {} bills into {}...",
            raw.len(),
            billing.default_currency
        ));

        let rates: Box<dyn ExchangeRateSource> = if self.offline {
            Box::new(Offline)
        } else {
            Box::new(rate_source(billing))
        };
        let bills = BillManager::process_bills(raw, &billing.default_currency, rates.as_ref());
        let manager = BillManager::new(bills);

        if self.json {
            let report = serde_json::json!({
                "bills": manager.bills(),
                "summary": manager.summary(),
            });
            output.print(&serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&output, &manager, &billing.default_currency);
        }

        Ok(())
    }
}

/// Live rates with retries and a shared cache.
fn rate_source(billing: &BillingConfig) -> RateCache<Retrying<FrankfurterClient>> {
    let client = FrankfurterClient::new(
        &billing.rates_url,
        Duration::from_secs(billing.timeout_secs),
    );
    let policy = RetryPolicy {
        max_retries: billing.max_retries,
        base_delay: Duration::from_millis(billing.retry_delay_ms),
    };
    RateCache::new(
        Retrying::new(client, policy),
        Duration::from_secs(billing.cache_ttl_secs),
    )
}

/// Rate source for `--offline`.
struct Offline;

impl ExchangeRateSource for Offline {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        Err(RateError::MissingRate {
            from: from.to_owned(),
            to: to.to_owned(),
        })
    }
}

fn bill_line(bill: &Bill) -> String {
    let unit = bill.target_unit.as_deref().unwrap_or_default();
    let sign = if bill.is_income() { "+" } else { "-" };
    let mut line = format!(
        "{}  {sign}{:>14}  {}",
        bill.date,
        format_money(bill.amount(), currency_symbol(unit)),
        bill.target
    );
    if !bill.description.is_empty() {
        line.push_str(&format!(" ({})", bill.description));
    }
    if let (Some(amount), Some(original)) = (bill.original_amount, &bill.original_unit) {
        line.push_str(&format!(" [{amount} {original}]"));
    }
    line
}

/// Separator and totals printed after the bill lines.
fn summary_lines(manager: &BillManager, currency: &str) -> Vec<String> {
    let symbol = currency_symbol(currency);
    let summary = manager.summary();
    vec![
        "=".repeat(70),
        format!("Income:    {}", format_money(summary.total_income, symbol)),
        format!("Outlay:    {}", format_money(summary.total_outlay, symbol)),
        format!("Available: {}", format_money(summary.available, symbol)),
    ]
}

fn print_report(output: &Output, manager: &BillManager, currency: &str) {
    for bill in manager.bills() {
        output.print(&bill_line(bill));
    }
    for line in summary_lines(manager, currency) {
        output.print(&line);
    }
    if manager.available().is_negative() {
        output.warning("Outlays exceed income");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_billing::BillType;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn sample() -> Bill {
        Bill {
            date: "2024-01-15".parse().unwrap(),
            original_amount: Some(30.0),
            original_unit: Some("USD".to_owned()),
            exchanged_amount: Some(1216.35),
            target_unit: Some("CNY".to_owned()),
            target: "Hosting".to_owned(),
            operator: "ops".to_owned(),
            description: "VPS".to_owned(),
            kind: BillType::Outlay,
        }
    }

    #[test]
    fn test_bill_line() {
        assert_eq!(
            bill_line(&sample()),
            "2024-01-15  -     ¥1,216.35  Hosting (VPS) [30 USD]"
        );
    }

    #[test]
    fn test_bill_line_income_without_original() {
        let bill = Bill {
            original_amount: None,
            original_unit: None,
            description: String::new(),
            kind: BillType::Income,
            ..sample()
        };
        assert_eq!(bill_line(&bill), "2024-01-15  +     ¥1,216.35  Hosting");
    }

    #[test]
    fn test_summary_lines() {
        let income = Bill {
            exchanged_amount: Some(100.0),
            kind: BillType::Income,
            ..sample()
        };
        let manager = BillManager::new(vec![income, sample()]);

        assert_eq!(
            summary_lines(&manager, "CNY"),
            vec![
                "=".repeat(70),
                "Income:    ¥100.00".to_owned(),
                "Outlay:    ¥1,216.35".to_owned(),
                "Available: -¥1,116.35".to_owned(),
            ]
        );
    }

    #[test]
    fn test_offline_source_errors() {
        assert!(Offline.rate("USD", "CNY").is_err());
    }

    #[test]
    #[traced_test]
    fn test_execute_offline() {
        let dir = tempfile::tempdir().unwrap();
        let bills = dir.path().join("bills.json");
        let config = dir.path().join("folio.toml");
        std::fs::write(
            &bills,
            r#"[{"date": "2024-01-15", "exchanged-amount": 216.35, "type": "income"}]"#,
        )
        .unwrap();
        std::fs::write(&config, "").unwrap();

        BillsArgs {
            bills_file: bills,
            currency: Some("usd".to_owned()),
            rates_url: None,
            offline: true,
            json: true,
            config: Some(config),
        }
        .execute()
        .unwrap();

        assert!(logs_contain("Loaded bills"));
    }
}
