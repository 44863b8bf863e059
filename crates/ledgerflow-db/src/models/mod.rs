//! Row models for the billing ledger tables.

pub mod colleague;
pub mod commission;
pub mod invoice;
pub mod representative;

pub use colleague::Colleague;
pub use commission::{Commission, CommissionStatus, CreateCommission};
pub use invoice::{CreateInvoice, Invoice, InvoiceStatus};
pub use representative::Representative;
