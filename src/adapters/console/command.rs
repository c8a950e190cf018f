use crate::domain::{
    BookId, LoanId, MemberId,
    commands::{AddBook, AddMember, IssueBook, ReturnBook},
};
use thiserror::Error;

/// A single console instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    AddBook(AddBook),
    AddMember(AddMember),
    Issue(IssueBook),
    Return(ReturnBook),
    Books,
    Members,
    Loans,
    Available,
    Active,
    Dashboard,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command} expects {expected} argument(s), got {got}")]
    WrongArgumentCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid id: {0:?}")]
    InvalidId(String),
}

pub const USAGE: &[&str] = &[
    "add-book <title> | <author> | <category>",
    "add-member <name> | <email> | <phone>",
    "issue <book-id> <member-id>",
    "return <loan-id>",
    "books",
    "members",
    "loans",
    "available",
    "active",
    "dashboard",
    "help",
    "quit",
];

/// Parse one input line
///
/// Blank lines and `#` comments yield `Ok(None)`. Text fields are passed
/// through untouched; blank-field checks belong to the ledger.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "add-book" => {
            let [title, author, category] = fields::<3>("add-book", rest)?;
            ConsoleCommand::AddBook(AddBook {
                title,
                author,
                category,
            })
        }
        "add-member" => {
            let [name, email, phone] = fields::<3>("add-member", rest)?;
            ConsoleCommand::AddMember(AddMember { name, email, phone })
        }
        "issue" => {
            let [book_id, member_id] = ids::<2>("issue", rest)?;
            ConsoleCommand::Issue(IssueBook {
                book_id: BookId::from_u64(book_id),
                member_id: MemberId::from_u64(member_id),
            })
        }
        "return" => {
            let [loan_id] = ids::<1>("return", rest)?;
            ConsoleCommand::Return(ReturnBook {
                loan_id: LoanId::from_u64(loan_id),
            })
        }
        "books" => no_args("books", rest, ConsoleCommand::Books)?,
        "members" => no_args("members", rest, ConsoleCommand::Members)?,
        "loans" => no_args("loans", rest, ConsoleCommand::Loans)?,
        "available" => no_args("available", rest, ConsoleCommand::Available)?,
        "active" => no_args("active", rest, ConsoleCommand::Active)?,
        "dashboard" => no_args("dashboard", rest, ConsoleCommand::Dashboard)?,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// `|`-separated text fields
fn fields<const N: usize>(command: &'static str, rest: &str) -> Result<[String; N], ParseError> {
    let parts: Vec<String> = rest.split('|').map(|p| p.trim().to_string()).collect();
    let got = parts.len();
    parts.try_into().map_err(|_| ParseError::WrongArgumentCount {
        command,
        expected: N,
        got,
    })
}

/// Whitespace-separated numeric ids
fn ids<const N: usize>(command: &'static str, rest: &str) -> Result<[u64; N], ParseError> {
    let parts = rest
        .split_whitespace()
        .map(|p| p.parse::<u64>().map_err(|_| ParseError::InvalidId(p.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    let got = parts.len();
    parts.try_into().map_err(|_| ParseError::WrongArgumentCount {
        command,
        expected: N,
        got,
    })
}

fn no_args(
    command: &'static str,
    rest: &str,
    parsed: ConsoleCommand,
) -> Result<ConsoleCommand, ParseError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(ParseError::WrongArgumentCount {
            command,
            expected: 0,
            got: rest.split_whitespace().count(),
        })
    }
}
