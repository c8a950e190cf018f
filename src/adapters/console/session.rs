use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::command::{self, ConsoleCommand, USAGE};
use crate::application::ledger::{LedgerService, Result};

/// Drive a console session until `quit` or end of input
///
/// Each input line produces exactly one JSON document on its own output line,
/// except blank lines, comments and `quit`.
pub async fn run<R, W>(service: &LedgerService, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let reply = match command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(cmd)) => execute(service, cmd).await,
            Err(e) => {
                tracing::debug!("Unparseable console line {:?}: {}", line, e);
                failure("parse", e.to_string())
            }
        };

        writer.write_all(reply.to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Run one parsed command against the ledger and render the reply
pub async fn execute(service: &LedgerService, command: ConsoleCommand) -> Value {
    match command {
        ConsoleCommand::AddBook(cmd) => reply(service.add_book(cmd).await),
        ConsoleCommand::AddMember(cmd) => reply(service.add_member(cmd).await),
        ConsoleCommand::Issue(cmd) => reply(service.issue_book(cmd).await),
        ConsoleCommand::Return(cmd) => reply(service.return_book(cmd).await),
        ConsoleCommand::Books => success(service.list_books().await),
        ConsoleCommand::Members => success(service.list_members().await),
        ConsoleCommand::Loans => success(service.loan_details().await),
        ConsoleCommand::Available => success(service.available_books().await),
        ConsoleCommand::Active => success(service.active_loans().await),
        ConsoleCommand::Dashboard => success(service.dashboard().await),
        ConsoleCommand::Help => success(USAGE),
        ConsoleCommand::Quit => success(Value::Null),
    }
}

fn reply<T: Serialize>(result: Result<T>) -> Value {
    match result {
        Ok(data) => success(data),
        Err(e) => json!({
            "ok": false,
            "error": { "kind": e.kind(), "message": e.to_string() },
        }),
    }
}

fn success<T: Serialize>(data: T) -> Value {
    match serde_json::to_value(data) {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(e) => failure("serialization", e.to_string()),
    }
}

fn failure(kind: &str, message: String) -> Value {
    json!({
        "ok": false,
        "error": { "kind": kind, "message": message },
    })
}
