#![allow(dead_code)]

use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt};
use library_ledger::adapters::clock::FixedClock;
use library_ledger::adapters::in_memory::EventStore as InMemoryEventStore;
use library_ledger::application::ledger::{LedgerService, ServiceDependencies};
use library_ledger::domain::commands::*;
use library_ledger::domain::events::DomainEvent;
use library_ledger::domain::loan::LoanPolicy;
use library_ledger::ports::event_store::{self, EventStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// テストの基準日
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

/// テスト用のサービス一式
pub struct TestLedger {
    pub service: LedgerService,
    pub event_store: Arc<InMemoryEventStore>,
    pub clock: Arc<FixedClock>,
}

/// インメモリEventStoreと固定時計でサービスを構築
pub fn setup() -> TestLedger {
    let event_store = Arc::new(InMemoryEventStore::new());
    let clock = Arc::new(FixedClock::new(today()));

    let service = LedgerService::new(ServiceDependencies {
        event_store: event_store.clone(),
        clock: clock.clone(),
        policy: LoanPolicy::default(),
    });

    TestLedger {
        service,
        event_store,
        clock,
    }
}

pub fn add_book(title: &str, author: &str, category: &str) -> AddBook {
    AddBook {
        title: title.to_string(),
        author: author.to_string(),
        category: category.to_string(),
    }
}

pub fn add_member(name: &str, email: &str, phone: &str) -> AddMember {
    AddMember {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    }
}

/// 追記の失敗を切り替えられるEventStore
pub struct FlakyEventStore {
    inner: InMemoryEventStore,
    failing: AtomicBool,
}

impl FlakyEventStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryEventStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.inner.snapshot()
    }
}

#[async_trait::async_trait]
impl EventStore for FlakyEventStore {
    async fn append(&self, events: Vec<DomainEvent>) -> event_store::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("journal unavailable".into());
        }
        self.inner.append(events).await
    }

    fn stream_all(&self) -> BoxStream<'_, event_store::Result<DomainEvent>> {
        if self.failing.load(Ordering::SeqCst) {
            let failure: Vec<event_store::Result<DomainEvent>> =
                vec![Err("journal unavailable".into())];
            return stream::iter(failure).boxed();
        }
        self.inner.stream_all()
    }
}
