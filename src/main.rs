use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use invoice_studio::clock::{Clock, SystemClock};
use invoice_studio::error::{InvoiceError, Result};
use invoice_studio::export::{download_csv, download_json};
use invoice_studio::format::{format_currency_with_decimals, format_date};
use invoice_studio::model::{Currency, LineItem, TaxType, PAYMENT_METHODS, PAYMENT_TERMS, TAX_TYPES};
use invoice_studio::storage::{default_data_dir, FileStore, StorageService};
use invoice_studio::validate::{validate_amount, validate_invoice};
use invoice_studio::Invoice;

#[derive(Parser)]
#[command(name = "invoice-studio")]
#[command(version, about = "Local-first invoice builder", long_about = None)]
struct Cli {
    /// Path to data directory (default: XDG data dir or ~/.invoice-studio)
    #[arg(short = 'C', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh draft (overwrites the current one)
    New {
        /// Invoice id (default: suggested INV-<year>-001)
        #[arg(long)]
        id: Option<String>,
    },

    /// Show the current draft with computed totals
    Show,

    /// Update fields on the current draft
    Set {
        #[arg(long)]
        id: Option<String>,

        /// Invoice date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,

        /// Currency code (see 'currencies')
        #[arg(long)]
        currency: Option<String>,

        /// Sender identity (multi-line, use \n)
        #[arg(long)]
        from: Option<String>,

        /// Recipient identity (multi-line, use \n)
        #[arg(long)]
        bill_to: Option<String>,

        /// Pre-tax/discount base amount
        #[arg(long, allow_negative_numbers = true)]
        project_total: Option<f64>,

        /// Tax percentage (0-100)
        #[arg(long, allow_negative_numbers = true)]
        tax_rate: Option<f64>,

        /// Tax preset code, sets the rate for you (see 'presets')
        #[arg(long, conflicts_with = "tax_rate")]
        tax_preset: Option<String>,

        /// Discount percentage (0-100)
        #[arg(long, allow_negative_numbers = true)]
        discount_rate: Option<f64>,

        #[arg(long)]
        notes: Option<String>,

        /// Payment terms (see 'presets')
        #[arg(long)]
        payment_terms: Option<String>,

        #[arg(long)]
        whatsapp: Option<String>,
    },

    /// Add a payment line item to the draft
    AddItem {
        #[arg(long)]
        description: String,

        #[arg(long, allow_negative_numbers = true)]
        amount: f64,

        /// Payment method (default: Bank Transfer)
        #[arg(long)]
        method: Option<String>,

        /// Item date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Remove a line item by its 1-based index from 'show'
    RemoveItem { index: usize },

    /// Check the draft and list every problem
    Validate,

    /// Snapshot the draft into history
    Save,

    /// List saved invoices, newest first
    History {
        /// Number of entries to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Copy a saved invoice back into the draft slot
    Load { id: String },

    /// Delete all history entries with the given id
    Delete { id: String },

    /// Export the draft as CSV or JSON
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the reusable company-details template
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// List supported currencies
    Currencies,

    /// List payment methods, payment terms, and tax presets
    Presets,

    /// Write all persisted data to a portable JSON bundle
    Backup { file: PathBuf },

    /// Restore a bundle written by 'backup'
    Restore { file: PathBuf },

    /// Erase the draft, history, templates, and company details
    Clear {
        /// Confirm the erase
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Show the stored template
    Show,

    /// Update template fields
    Set {
        /// Sender identity (multi-line, use \n)
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        whatsapp: Option<String>,

        #[arg(long)]
        account_name: Option<String>,

        #[arg(long)]
        account_number: Option<String>,

        #[arg(long)]
        bank_name: Option<String>,

        #[arg(long)]
        swift_code: Option<String>,
    },

    /// Copy the template into the current draft
    Apply,
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(p) => p,
        None => default_data_dir()?,
    };
    let mut svc = StorageService::new(FileStore::new(data_dir));
    let clock = SystemClock;

    match cli.command {
        Commands::New { id } => cmd_new(&mut svc, &clock, id),
        Commands::Show => cmd_show(&svc),
        Commands::Set {
            id,
            date,
            due_date,
            currency,
            from,
            bill_to,
            project_total,
            tax_rate,
            tax_preset,
            discount_rate,
            notes,
            payment_terms,
            whatsapp,
        } => cmd_set(
            &mut svc,
            SetFields {
                id,
                date,
                due_date,
                currency,
                from,
                bill_to,
                project_total,
                tax_rate,
                tax_preset,
                discount_rate,
                notes,
                payment_terms,
                whatsapp,
            },
        ),
        Commands::AddItem {
            description,
            amount,
            method,
            date,
        } => cmd_add_item(&mut svc, &clock, description, amount, method, date),
        Commands::RemoveItem { index } => cmd_remove_item(&mut svc, index),
        Commands::Validate => cmd_validate(&svc),
        Commands::Save => cmd_save(&mut svc, &clock),
        Commands::History { limit } => cmd_history(&svc, limit),
        Commands::Load { id } => cmd_load(&mut svc, &id),
        Commands::Delete { id } => cmd_delete(&mut svc, &id),
        Commands::Export { format, output } => cmd_export(&svc, &clock, format, output),
        Commands::Company { command } => match command {
            CompanyCommands::Show => cmd_company_show(&svc),
            CompanyCommands::Set {
                from,
                whatsapp,
                account_name,
                account_number,
                bank_name,
                swift_code,
            } => cmd_company_set(
                &mut svc,
                from,
                whatsapp,
                account_name,
                account_number,
                bank_name,
                swift_code,
            ),
            CompanyCommands::Apply => cmd_company_apply(&mut svc),
        },
        Commands::Currencies => cmd_currencies(),
        Commands::Presets => cmd_presets(),
        Commands::Backup { file } => cmd_backup(&svc, &clock, &file),
        Commands::Restore { file } => cmd_restore(&mut svc, &clock, &file),
        Commands::Clear { yes } => cmd_clear(&mut svc, yes),
    }
}

/// Load the draft, degrading unreadable storage to "no draft" with a logged
/// diagnostic.
fn load_draft(svc: &StorageService<FileStore>) -> Result<Invoice> {
    match svc.load_current_invoice() {
        Ok(Some(invoice)) => Ok(invoice),
        Ok(None) => Err(InvoiceError::NoDraft),
        Err(e) => {
            warn!("treating unreadable draft as absent: {e}");
            Err(InvoiceError::NoDraft)
        }
    }
}

fn money(invoice: &Invoice, value: f64) -> String {
    format!(
        "{}{}",
        invoice.currency.symbol(),
        format_currency_with_decimals(Some(value))
    )
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn parse_date_arg(value: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| value.to_string())
        .map_err(|_| InvoiceError::InvalidDate(value.to_string()))
}

fn cmd_new(
    svc: &mut StorageService<FileStore>,
    clock: &impl Clock,
    id: Option<String>,
) -> Result<()> {
    let mut draft = Invoice::new_draft(clock);
    if let Some(id) = id {
        draft.id = id;
    }

    svc.save_current_invoice(&draft)?;

    println!("Started draft {}", draft.id);
    println!("  Date: {}", format_date(&draft.date));
    println!("  Due:  {}", format_date(&draft.due_date));
    println!();
    println!("Fill it in with 'set' and 'add-item', then 'save'.");

    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "DATE")]
    date: String,
}

fn cmd_show(svc: &StorageService<FileStore>) -> Result<()> {
    let mut draft = load_draft(svc)?;
    draft.recompute_totals();

    println!("Invoice {}", draft.id);
    println!(
        "  Date:     {} (due {})",
        format_date(&draft.date),
        format_date(&draft.due_date)
    );
    println!(
        "  Currency: {} ({})",
        draft.currency.code(),
        draft.currency.symbol()
    );
    println!("  From:     {}", first_line(&draft.from));
    println!("  Bill to:  {}", first_line(&draft.bill_to));
    println!("  Terms:    {}", draft.payment_terms);

    if draft.items.is_empty() {
        println!();
        println!("No line items. Add one with 'add-item'.");
    } else {
        let rows: Vec<ItemRow> = draft
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| ItemRow {
                index: idx + 1,
                description: item.description.clone(),
                amount: money(&draft, item.amount),
                method: item.method.clone(),
                date: format_date(&item.date),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!();
        println!("{table}");
    }

    println!();
    println!("  Subtotal:       {}", money(&draft, draft.project_total));
    println!(
        "  Tax ({}%):      {}",
        draft.tax_rate,
        money(&draft, draft.tax)
    );
    println!(
        "  Discount ({}%): {}",
        draft.discount_rate,
        money(&draft, draft.discount)
    );
    println!("  Total:          {}", money(&draft, draft.grand_total()));

    Ok(())
}

struct SetFields {
    id: Option<String>,
    date: Option<String>,
    due_date: Option<String>,
    currency: Option<String>,
    from: Option<String>,
    bill_to: Option<String>,
    project_total: Option<f64>,
    tax_rate: Option<f64>,
    tax_preset: Option<String>,
    discount_rate: Option<f64>,
    notes: Option<String>,
    payment_terms: Option<String>,
    whatsapp: Option<String>,
}

fn cmd_set(svc: &mut StorageService<FileStore>, fields: SetFields) -> Result<()> {
    let mut draft = load_draft(svc)?;

    if let Some(id) = fields.id {
        draft.id = id;
    }
    if let Some(date) = fields.date {
        draft.date = parse_date_arg(&date)?;
    }
    if let Some(due_date) = fields.due_date {
        draft.due_date = parse_date_arg(&due_date)?;
    }
    if let Some(code) = fields.currency {
        draft.currency =
            Currency::from_code(&code).ok_or_else(|| InvoiceError::UnknownCurrency(code))?;
    }
    if let Some(from) = fields.from {
        draft.from = from;
    }
    if let Some(bill_to) = fields.bill_to {
        draft.bill_to = bill_to;
    }
    if let Some(total) = fields.project_total {
        if !validate_amount(total) {
            return Err(InvoiceError::NegativeAmount);
        }
        draft.project_total = total;
    }
    if let Some(rate) = fields.tax_rate {
        if rate.is_nan() || !(0.0..=100.0).contains(&rate) {
            return Err(InvoiceError::InvalidRate);
        }
        draft.tax_rate = rate;
    }
    if let Some(code) = fields.tax_preset {
        let preset =
            TaxType::from_code(&code).ok_or_else(|| InvoiceError::UnknownTaxPreset(code))?;
        draft.tax_rate = preset.rate;
    }
    if let Some(rate) = fields.discount_rate {
        if rate.is_nan() || !(0.0..=100.0).contains(&rate) {
            return Err(InvoiceError::InvalidRate);
        }
        draft.discount_rate = rate;
    }
    if let Some(notes) = fields.notes {
        draft.notes = notes;
    }
    if let Some(terms) = fields.payment_terms {
        if !PAYMENT_TERMS.contains(&terms.as_str()) {
            println!("Note: '{terms}' is not a listed payment term.");
        }
        draft.payment_terms = terms;
    }
    if let Some(whatsapp) = fields.whatsapp {
        draft.whatsapp_number = whatsapp;
    }

    draft.recompute_totals();
    svc.save_current_invoice(&draft)?;

    println!("Updated draft {}", draft.id);
    println!("  Total: {}", money(&draft, draft.grand_total()));

    Ok(())
}

fn cmd_add_item(
    svc: &mut StorageService<FileStore>,
    clock: &impl Clock,
    description: String,
    amount: f64,
    method: Option<String>,
    date: Option<String>,
) -> Result<()> {
    if description.trim().is_empty() {
        return Err(InvoiceError::EmptyDescription);
    }
    if !validate_amount(amount) {
        return Err(InvoiceError::NegativeAmount);
    }

    let method = method.unwrap_or_else(|| "Bank Transfer".to_string());
    if !PAYMENT_METHODS.contains(&method.as_str()) {
        println!("Note: '{method}' is not a listed payment method.");
    }

    let date = match date {
        Some(d) => parse_date_arg(&d)?,
        None => clock.today().format("%Y-%m-%d").to_string(),
    };

    let mut draft = load_draft(svc)?;
    draft.items.push(LineItem {
        description: description.clone(),
        amount,
        method,
        date,
    });
    draft.recompute_totals();
    svc.save_current_invoice(&draft)?;

    println!(
        "Added '{}' ({}) - {} item(s)",
        description,
        money(&draft, amount),
        draft.items.len()
    );

    Ok(())
}

fn cmd_remove_item(svc: &mut StorageService<FileStore>, index: usize) -> Result<()> {
    let mut draft = load_draft(svc)?;

    if index == 0 || index > draft.items.len() {
        return Err(InvoiceError::InvalidItemIndex {
            index,
            count: draft.items.len(),
        });
    }

    let removed = draft.items.remove(index - 1);
    draft.recompute_totals();
    svc.save_current_invoice(&draft)?;

    println!(
        "Removed '{}' - {} item(s) left",
        removed.description,
        draft.items.len()
    );

    Ok(())
}

fn cmd_validate(svc: &StorageService<FileStore>) -> Result<()> {
    let draft = load_draft(svc)?;
    let report = validate_invoice(&draft);

    if report.is_valid {
        println!("Draft {} is valid.", draft.id);
    } else {
        println!("Draft {} has problems:", draft.id);
        for error in &report.errors {
            println!("  - {error}");
        }
    }

    Ok(())
}

fn cmd_save(svc: &mut StorageService<FileStore>, clock: &impl Clock) -> Result<()> {
    let mut draft = load_draft(svc)?;
    draft.recompute_totals();

    let report = validate_invoice(&draft);
    if !report.is_valid {
        return Err(InvoiceError::InvalidInvoice(report.errors));
    }

    svc.add_to_history(&draft, clock)?;
    svc.save_current_invoice(&draft)?;

    println!(
        "Saved {} to history (total {})",
        draft.id,
        money(&draft, draft.grand_total())
    );

    Ok(())
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SAVED")]
    saved: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "BILL TO")]
    bill_to: String,
}

fn cmd_history(svc: &StorageService<FileStore>, limit: Option<usize>) -> Result<()> {
    let history = svc.get_history().unwrap_or_else(|e| {
        warn!("treating unreadable history as empty: {e}");
        Vec::new()
    });

    if history.is_empty() {
        println!("No saved invoices yet.");
        return Ok(());
    }

    let total_count = history.len();
    let shown = match limit {
        Some(n) => &history[..n.min(history.len())],
        None => &history[..],
    };

    let rows: Vec<HistoryRow> = shown
        .iter()
        .enumerate()
        .map(|(idx, entry)| HistoryRow {
            index: idx + 1,
            id: entry.invoice.id.clone(),
            saved: entry.saved_at.format("%Y-%m-%d %H:%M").to_string(),
            total: money(&entry.invoice, entry.invoice.grand_total()),
            bill_to: first_line(&entry.invoice.bill_to).to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {total_count} invoice(s)");

    Ok(())
}

fn cmd_load(svc: &mut StorageService<FileStore>, id: &str) -> Result<()> {
    let entry = svc
        .get_from_history(id)?
        .ok_or_else(|| InvoiceError::InvoiceNotFound(id.to_string()))?;

    svc.save_current_invoice(&entry.invoice)?;

    println!("Loaded {} into the draft slot", entry.invoice.id);
    Ok(())
}

fn cmd_delete(svc: &mut StorageService<FileStore>, id: &str) -> Result<()> {
    if svc.get_from_history(id)?.is_none() {
        return Err(InvoiceError::InvoiceNotFound(id.to_string()));
    }

    svc.delete_from_history(id)?;

    println!("Deleted {id} from history");
    Ok(())
}

fn cmd_export(
    svc: &StorageService<FileStore>,
    clock: &impl Clock,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut draft = load_draft(svc)?;
    draft.recompute_totals();

    let report = validate_invoice(&draft);
    if !report.is_valid {
        return Err(InvoiceError::InvalidInvoice(report.errors));
    }

    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;

    let path = match format {
        ExportFormat::Csv => download_csv(&draft, &dir, clock)?,
        ExportFormat::Json => download_json(&draft, &dir, clock)?,
    };

    println!("Exported {}", draft.id);
    println!("  Saved: {}", path.display());

    Ok(())
}

fn cmd_company_show(svc: &StorageService<FileStore>) -> Result<()> {
    let details = svc.load_company_details().unwrap_or_else(|e| {
        warn!("treating unreadable company details as absent: {e}");
        None
    });

    let Some(details) = details else {
        println!("No company details stored. Set them with 'company set'.");
        return Ok(());
    };

    println!("Company details");
    println!("  From:     {}", first_line(&details.from));
    println!("  WhatsApp: {}", details.whatsapp_number);
    if !details.bank_details.bank_name.is_empty() {
        println!(
            "  Bank:     {} ({})",
            details.bank_details.bank_name, details.bank_details.account_number
        );
    }

    Ok(())
}

fn cmd_company_set(
    svc: &mut StorageService<FileStore>,
    from: Option<String>,
    whatsapp: Option<String>,
    account_name: Option<String>,
    account_number: Option<String>,
    bank_name: Option<String>,
    swift_code: Option<String>,
) -> Result<()> {
    let mut details = svc.load_company_details()?.unwrap_or_default();

    if let Some(from) = from {
        details.from = from;
    }
    if let Some(whatsapp) = whatsapp {
        details.whatsapp_number = whatsapp;
    }
    if let Some(name) = account_name {
        details.bank_details.account_name = name;
    }
    if let Some(number) = account_number {
        details.bank_details.account_number = number;
    }
    if let Some(name) = bank_name {
        details.bank_details.bank_name = name;
    }
    if let Some(code) = swift_code {
        details.bank_details.swift_code = code;
    }

    svc.save_company_details(&details)?;

    println!("Saved company details");
    Ok(())
}

fn cmd_company_apply(svc: &mut StorageService<FileStore>) -> Result<()> {
    let details = svc
        .load_company_details()?
        .ok_or(InvoiceError::NoCompanyDetails)?;

    let mut draft = load_draft(svc)?;
    draft.from = details.from;
    draft.whatsapp_number = details.whatsapp_number;
    draft.logo = details.logo;
    draft.bank_details = details.bank_details;
    svc.save_current_invoice(&draft)?;

    println!("Applied company details to draft {}", draft.id);
    Ok(())
}

#[derive(Tabled)]
struct CurrencyRow {
    #[tabled(rename = "CODE")]
    code: &'static str,
    #[tabled(rename = "SYMBOL")]
    symbol: &'static str,
    #[tabled(rename = "NAME")]
    name: &'static str,
}

fn cmd_currencies() -> Result<()> {
    let rows: Vec<CurrencyRow> = Currency::ALL
        .iter()
        .map(|c| CurrencyRow {
            code: c.code(),
            symbol: c.symbol(),
            name: c.display_name(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

#[derive(Tabled)]
struct TaxPresetRow {
    #[tabled(rename = "CODE")]
    code: &'static str,
    #[tabled(rename = "NAME")]
    name: &'static str,
    #[tabled(rename = "RATE")]
    rate: String,
}

fn cmd_presets() -> Result<()> {
    println!("Payment methods:");
    for method in PAYMENT_METHODS {
        println!("  - {method}");
    }

    println!();
    println!("Payment terms:");
    for terms in PAYMENT_TERMS {
        println!("  - {terms}");
    }

    println!();
    println!("Tax presets (apply with 'set --tax-preset <CODE>'):");
    let rows: Vec<TaxPresetRow> = TAX_TYPES
        .iter()
        .map(|t| TaxPresetRow {
            code: t.code,
            name: t.name,
            rate: format!("{}%", t.rate),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn cmd_backup(
    svc: &StorageService<FileStore>,
    clock: &impl Clock,
    file: &PathBuf,
) -> Result<()> {
    let bundle = svc.export_data(clock);
    let json = serde_json::to_string_pretty(&bundle)?;
    std::fs::write(file, json)?;

    println!("Backed up to {}", file.display());
    println!(
        "  Draft: {}, history: {} entr(ies), company details: {}",
        if bundle.current.is_some() { "yes" } else { "no" },
        bundle.history.len(),
        if bundle.company.is_some() { "yes" } else { "no" }
    );

    Ok(())
}

fn cmd_restore(
    svc: &mut StorageService<FileStore>,
    clock: &impl Clock,
    file: &PathBuf,
) -> Result<()> {
    if !file.exists() {
        return Err(InvoiceError::BackupNotFound(file.clone()));
    }

    let json = std::fs::read_to_string(file)?;
    let bundle = serde_json::from_str(&json).map_err(|e| InvoiceError::Restore(e.to_string()))?;

    svc.import_data(&bundle, clock)?;

    println!("Restored from {}", file.display());
    Ok(())
}

fn cmd_clear(svc: &mut StorageService<FileStore>, yes: bool) -> Result<()> {
    if !yes {
        println!("This erases the draft, history, templates, and company details.");
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }

    svc.clear_all()?;

    println!("Cleared all stored data.");
    Ok(())
}
