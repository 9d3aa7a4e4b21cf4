//! Field and record validation. Pure predicates; aggregate validation
//! collects every failing check so the caller can show all problems at once.

use crate::format::format_phone_number;
use crate::model::{Invoice, LineItem};

/// Cheap `local@domain.tld` shape check, deliberately not RFC-complete: no
/// whitespace or extra `@`, and at least one interior dot after the `@`.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if email.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Valid iff at least ten digits remain after stripping everything else.
pub fn validate_phone_number(phone: &str) -> bool {
    format_phone_number(phone).len() >= 10
}

pub fn validate_invoice_id(id: &str) -> bool {
    !id.trim().is_empty()
}

/// Non-negative and an actual number. Negative amounts are rejected, never
/// clamped.
pub fn validate_amount(amount: f64) -> bool {
    !amount.is_nan() && amount >= 0.0
}

pub fn validate_line_item(item: &LineItem) -> bool {
    !item.description.trim().is_empty() && validate_amount(item.amount)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Aggregate check gating save and export. Failing checks are collected in
/// order rather than short-circuited.
pub fn validate_invoice(invoice: &Invoice) -> ValidationReport {
    let mut errors = Vec::new();

    if !validate_invoice_id(&invoice.id) {
        errors.push("Invoice ID is required".to_string());
    }
    if invoice.date.is_empty() {
        errors.push("Invoice date is required".to_string());
    }
    if invoice.bill_to.trim().is_empty() {
        errors.push("Bill to is required".to_string());
    }
    if !(invoice.project_total > 0.0) {
        errors.push("Project total must be greater than 0".to_string());
    }
    if invoice.items.is_empty() {
        errors.push("At least one payment item is required".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
