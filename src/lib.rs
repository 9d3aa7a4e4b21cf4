pub mod clock;
pub mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod pdf;
pub mod storage;
pub mod validate;

pub use clock::{Clock, SystemClock};
pub use error::{InvoiceError, Result};
pub use model::{BankDetails, CompanyDetails, Currency, Invoice, LineItem};
pub use storage::{DataBundle, FileStore, HistoryEntry, MemoryStore, StorageService};
pub use validate::{validate_invoice, ValidationReport};
