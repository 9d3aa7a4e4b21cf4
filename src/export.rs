//! CSV and JSON export of a single invoice, plus the file-writing wrappers
//! that name the output `Invoice_<id>_<YYYY-MM-DD>.<ext>`.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::Invoice;

/// Two-section CSV: a single summary row (status hardcoded to `UNPAID`,
/// multi-line bill-to flattened to one line), a blank separator, then one row
/// per line item.
///
/// Text fields are quote-wrapped but embedded double quotes are not escaped;
/// known limitation carried over from the original format.
pub fn export_as_csv(invoice: &Invoice) -> String {
    let mut csv = String::from("Invoice #,Date,Due Date,Bill To,Total,Status\n");

    let bill_to = invoice.bill_to.replace('\n', " ");
    csv.push_str(&format!(
        "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"UNPAID\"\n",
        invoice.id, invoice.date, invoice.due_date, bill_to, invoice.project_total
    ));

    csv.push_str("\n\nPayment Items\n");
    csv.push_str("Description,Amount,Method,Date\n");
    for item in &invoice.items {
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"\n",
            item.description, item.amount, item.method, item.date
        ));
    }

    csv
}

/// Pretty-printed (2-space indent) full serialization; parsing it back yields
/// a record equal to the original.
pub fn export_as_json(invoice: &Invoice) -> Result<String> {
    Ok(serde_json::to_string_pretty(invoice)?)
}

pub fn export_file_name(id: &str, today: NaiveDate, ext: &str) -> String {
    format!("Invoice_{}_{}.{}", id, today.format("%Y-%m-%d"), ext)
}

/// Write the CSV export into `dir` and return the path.
pub fn download_csv(invoice: &Invoice, dir: &Path, clock: &impl Clock) -> Result<PathBuf> {
    let path = dir.join(export_file_name(&invoice.id, clock.today(), "csv"));
    fs::write(&path, export_as_csv(invoice))?;
    Ok(path)
}

/// Write the JSON export into `dir` and return the path.
pub fn download_json(invoice: &Invoice, dir: &Path, clock: &impl Clock) -> Result<PathBuf> {
    let path = dir.join(export_file_name(&invoice.id, clock.today(), "json"));
    fs::write(&path, export_as_json(invoice)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::LineItem;
    use chrono::{TimeZone, Utc};

    fn sample() -> Invoice {
        Invoice {
            id: "INV-2024-001".to_string(),
            date: "2024-01-01".to_string(),
            due_date: "2024-01-15".to_string(),
            bill_to: "Acme Corp\nSpringfield".to_string(),
            project_total: 1000.0,
            tax_rate: 5.0,
            items: vec![LineItem {
                description: "Design".to_string(),
                amount: 1000.0,
                method: "Bank Transfer".to_string(),
                date: "2024-01-01".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn csv_has_summary_separator_and_item_rows() {
        let csv = export_as_csv(&sample());
        let expected = "Invoice #,Date,Due Date,Bill To,Total,Status\n\
            \"INV-2024-001\",\"2024-01-01\",\"2024-01-15\",\"Acme Corp Springfield\",\"1000\",\"UNPAID\"\n\
            \n\nPayment Items\n\
            Description,Amount,Method,Date\n\
            \"Design\",\"1000\",\"Bank Transfer\",\"2024-01-01\"\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn csv_flattens_multiline_bill_to() {
        let csv = export_as_csv(&sample());
        assert!(csv.contains("\"Acme Corp Springfield\""));
        assert!(!csv.contains("Acme Corp\nSpringfield"));
    }

    #[test]
    fn json_round_trips_losslessly() {
        let invoice = sample();
        let json = export_as_json(&invoice).unwrap();
        assert!(json.contains("\n  \"id\""));
        let back: Invoice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, invoice);
    }

    #[test]
    fn file_names_embed_id_and_date() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        assert_eq!(
            export_file_name("INV-2024-001", today, "csv"),
            "Invoice_INV-2024-001_2024-02-03.csv"
        );
    }

    #[test]
    fn download_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap());
        let invoice = sample();

        let csv_path = download_csv(&invoice, dir.path(), &clock).unwrap();
        assert!(csv_path.ends_with("Invoice_INV-2024-001_2024-02-03.csv"));
        assert!(csv_path.exists());

        let json_path = download_json(&invoice, dir.path(), &clock).unwrap();
        assert!(json_path.exists());
        let back: Invoice =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back, invoice);
    }
}
