//! Bill summaries for the folio bill widget.
//!
//! Bills are read from a JSON data file, converted into a display currency
//! with live exchange rates, and summed into income, outlay and available
//! balance.
//!
//! ```
//! use folio_billing::{BillManager, currency_symbol, format_money, parse_bills};
//! use folio_billing::rates::FrankfurterClient;
//!
//! let raw = parse_bills(r#"[{"date": "2024-01-15", "exchanged-amount": 216.35, "type": "income"}]"#)?;
//! let bills = BillManager::process_bills(raw, "CNY", &FrankfurterClient::default());
//! let manager = BillManager::new(bills);
//!
//! assert_eq!(format_money(manager.available(), currency_symbol("CNY")), "¥216.35");
//! # Ok::<(), serde_json::Error>(())
//! ```

mod bill;
mod manager;
mod money;
pub mod rates;

pub use bill::{Bill, BillType, parse_bills};
pub use manager::{BillManager, BillSummary, currency_symbol};
pub use money::{Money, format_money};
pub use rates::{ExchangeRateSource, RateError};
