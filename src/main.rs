use library_ledger::{
    adapters::{clock::SystemClock, console, in_memory::EventStore as InMemoryEventStore},
    application::ledger::{LedgerService, ServiceDependencies},
    config::{Config, DEFAULT_LOG_FILTER},
};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the JSON replies, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        loan_period_days = config.loan_period_days,
        "Starting library ledger console"
    );

    let service_deps = ServiceDependencies {
        event_store: Arc::new(InMemoryEventStore::new()),
        clock: Arc::new(SystemClock),
        policy: config.loan_policy(),
    };
    let service = LedgerService::new(service_deps);

    console::run(
        &service,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    let dashboard = service.dashboard().await;
    tracing::info!(
        total_books = dashboard.total_books,
        total_members = dashboard.total_members,
        active_loans = dashboard.active_loans,
        "Console session ended"
    );

    Ok(())
}
