use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Failed to read '{key}' from storage: {reason}")]
    StorageRead { key: &'static str, reason: String },

    #[error("Failed to write '{key}' to storage: {reason}")]
    StorageWrite { key: &'static str, reason: String },

    #[error("Stored value for '{key}' is not valid JSON: {reason}")]
    StorageCorrupt { key: &'static str, reason: String },

    #[error("No current draft. Run 'invoice-studio new' to start one.")]
    NoDraft,

    #[error("Invoice '{0}' not found in history")]
    InvoiceNotFound(String),

    #[error("Invoice is not valid:\n{}", format_errors(.0))]
    InvalidInvoice(Vec<String>),

    #[error("Unknown currency code '{0}'. Run 'invoice-studio currencies' to list supported codes.")]
    UnknownCurrency(String),

    #[error("Unknown tax preset '{0}'. Run 'invoice-studio presets' to list them.")]
    UnknownTaxPreset(String),

    #[error("Invalid item index {index} (invoice has {count} item(s))")]
    InvalidItemIndex { index: usize, count: usize },

    #[error("Amount must be zero or greater")]
    NegativeAmount,

    #[error("Rate must be between 0 and 100")]
    InvalidRate,

    #[error("Item description must not be empty")]
    EmptyDescription,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("No company details stored. Set them with 'company set'.")]
    NoCompanyDetails,

    #[error("Backup file not found: {0}")]
    BackupNotFound(PathBuf),

    #[error("Failed to restore backup: {0}")]
    Restore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
