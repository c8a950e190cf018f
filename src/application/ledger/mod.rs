mod errors;
mod ledger_service;
mod views;

pub use errors::{ErrorKind, LedgerError, Result};
pub use ledger_service::{LedgerService, ServiceDependencies};
pub use views::{Dashboard, LoanDetails};
