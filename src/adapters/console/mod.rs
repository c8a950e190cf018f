pub mod command;
pub mod session;

pub use command::{ConsoleCommand, ParseError, parse};
pub use session::{execute, run};
