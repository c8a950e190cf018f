pub mod book;
pub mod commands;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod member;
pub mod value_objects;

pub use errors::*;
pub use events::*;
pub use loan::LoanStatus;
pub use value_objects::*;
