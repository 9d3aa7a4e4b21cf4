mod catalog;

pub use catalog::{Currency, TaxType, PAYMENT_METHODS, PAYMENT_TERMS, TAX_TYPES};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::format::{calculate_percentage, round_to_two};

/// Default payment window applied to a fresh draft's due date.
pub const DEFAULT_DUE_DAYS: i64 = 14;

const DEFAULT_FROM: &str = "Your Company Name\nCity, Country\nemail@example.com";
const DEFAULT_BILL_TO: &str = "Client Name\nCity, Country\nclient@email.com";
const DEFAULT_NOTES: &str = "Thank you for your trust and collaboration. \
This invoice reflects the agreed services. Kindly process the payment before the due date.";

/// A single payment line on the invoice. Dates are `YYYY-MM-DD` strings so a
/// draft can hold an empty value while the user is still typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
    pub method: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub swift_code: String,
}

/// Reusable sender-identity template, persisted independently of any single
/// invoice so a new draft can be pre-filled from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDetails {
    pub from: String,
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub bank_details: BankDetails,
}

/// The sole aggregate. Field names serialize in camelCase so persisted
/// drafts, history snapshots, and JSON exports share one wire shape.
///
/// `tax` and `discount` are derived from `project_total` and the rates; they
/// are stored for export fidelity but recomputed on every mutation and never
/// trusted independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    pub id: String,
    pub date: String,
    pub due_date: String,
    pub currency: Currency,
    pub from: String,
    pub bill_to: String,
    pub items: Vec<LineItem>,
    pub project_total: f64,
    pub tax_rate: f64,
    pub tax: f64,
    pub discount_rate: f64,
    pub discount: f64,
    pub notes: String,
    pub payment_terms: String,
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub bank_details: BankDetails,
}

impl Invoice {
    /// Fresh draft with the standard defaults: today's date, due date two
    /// weeks out, a suggested id for the current year, and one placeholder
    /// line item.
    pub fn new_draft(clock: &impl Clock) -> Self {
        let today = clock.today();
        let date = today.format("%Y-%m-%d").to_string();

        Invoice {
            id: format!("INV-{}-001", today.year()),
            date: date.clone(),
            due_date: (today + chrono::Duration::days(DEFAULT_DUE_DAYS))
                .format("%Y-%m-%d")
                .to_string(),
            currency: Currency::Usd,
            from: DEFAULT_FROM.to_string(),
            bill_to: DEFAULT_BILL_TO.to_string(),
            items: vec![LineItem {
                description: "Service Description".to_string(),
                amount: 0.0,
                method: "Bank Transfer".to_string(),
                date,
            }],
            notes: DEFAULT_NOTES.to_string(),
            payment_terms: "NET 14".to_string(),
            ..Default::default()
        }
    }

    /// Refresh the derived tax and discount amounts from the stored rates.
    pub fn recompute_totals(&mut self) {
        self.tax = round_to_two(calculate_percentage(self.project_total, self.tax_rate));
        self.discount = round_to_two(calculate_percentage(self.project_total, self.discount_rate));
    }

    /// `project_total + tax - discount`, always derived from the rates.
    pub fn grand_total(&self) -> f64 {
        let tax = calculate_percentage(self.project_total, self.tax_rate);
        let discount = calculate_percentage(self.project_total, self.discount_rate);
        round_to_two(self.project_total + tax - discount)
    }
}
