//! Static reference data: supported currencies, payment methods, payment
//! terms, and tax presets. Consumed by the CLI for option validation and
//! display; none of it is computed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "AED")]
    Aed,
    #[serde(rename = "PKR")]
    Pkr,
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "CAD")]
    Cad,
    #[serde(rename = "AUD")]
    Aud,
    #[serde(rename = "JPY")]
    Jpy,
    #[serde(rename = "CNY")]
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Aed,
        Currency::Pkr,
        Currency::Inr,
        Currency::Cad,
        Currency::Aud,
        Currency::Jpy,
        Currency::Cny,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aed => "AED",
            Currency::Pkr => "PKR",
            Currency::Inr => "INR",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Aed => "د.إ",
            Currency::Pkr => "₨",
            Currency::Inr => "₹",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Jpy => "¥",
            Currency::Cny => "¥",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
            Currency::Aed => "UAE Dirham",
            Currency::Pkr => "Pakistani Rupee",
            Currency::Inr => "Indian Rupee",
            Currency::Cad => "Canadian Dollar",
            Currency::Aud => "Australian Dollar",
            Currency::Jpy => "Japanese Yen",
            Currency::Cny => "Chinese Yuan",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub const PAYMENT_METHODS: &[&str] = &[
    "Bank Transfer",
    "Check",
    "Cash",
    "Credit Card",
    "PayPal",
    "Google Pay",
    "Apple Pay",
    "Wire Transfer",
    "Cryptocurrency",
    "Other",
];

pub const PAYMENT_TERMS: &[&str] = &[
    "NET 7",
    "NET 14",
    "NET 30",
    "NET 45",
    "NET 60",
    "DUE ON RECEIPT",
    "CUSTOM",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxType {
    pub code: &'static str,
    pub name: &'static str,
    pub rate: f64,
}

impl TaxType {
    pub fn from_code(code: &str) -> Option<&'static TaxType> {
        TAX_TYPES.iter().find(|t| t.code.eq_ignore_ascii_case(code))
    }
}

pub const TAX_TYPES: &[TaxType] = &[
    TaxType {
        code: "NONE",
        name: "No Tax",
        rate: 0.0,
    },
    TaxType {
        code: "GST",
        name: "GST (5%)",
        rate: 5.0,
    },
    TaxType {
        code: "VAT",
        name: "VAT (20%)",
        rate: 20.0,
    },
    TaxType {
        code: "TAX",
        name: "Sales Tax (7%)",
        rate: 7.0,
    },
    TaxType {
        code: "PST",
        name: "PST (8%)",
        rate: 8.0,
    },
    TaxType {
        code: "CUSTOM",
        name: "Custom Tax Rate",
        rate: 0.0,
    },
];
