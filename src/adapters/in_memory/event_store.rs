use crate::domain::events::DomainEvent;
use crate::ports::event_store::{EventStore as EventStoreTrait, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Mutex;

/// In-memory implementation of EventStore
///
/// Keeps the journal for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Mutex<Vec<DomainEvent>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the journal, e.g. to restore a ledger in tests
    pub fn with_events(events: Vec<DomainEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    /// Copy of all recorded events in append order
    pub fn snapshot(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl EventStoreTrait for EventStore {
    async fn append(&self, events: Vec<DomainEvent>) -> Result<()> {
        let mut journal = self
            .events
            .lock()
            .map_err(|_| "event journal lock poisoned")?;
        journal.extend(events);
        Ok(())
    }

    fn stream_all(&self) -> BoxStream<'_, Result<DomainEvent>> {
        let events: Vec<Result<DomainEvent>> = match self.events.lock() {
            Ok(events) => events.iter().cloned().map(Ok).collect(),
            Err(_) => vec![Err("event journal lock poisoned".into())],
        };
        stream::iter(events).boxed()
    }
}
