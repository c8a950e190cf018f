use chrono::NaiveDate;
use library_ledger::adapters::clock::FixedClock;
use library_ledger::adapters::in_memory::EventStore as InMemoryEventStore;
use library_ledger::application::ledger::{
    Dashboard, ErrorKind, LedgerError, LedgerService, ServiceDependencies,
};
use library_ledger::domain::commands::*;
use library_ledger::domain::events::DomainEvent;
use library_ledger::domain::loan::{LoanPolicy, LoanStatus};
use library_ledger::domain::value_objects::*;
use library_ledger::ports::Clock;
use std::sync::Arc;

mod common;

use common::{FlakyEventStore, add_book, add_member, setup, today};

fn issue(book: u64, member: u64) -> IssueBook {
    IssueBook {
        book_id: BookId::from_u64(book),
        member_id: MemberId::from_u64(member),
    }
}

fn return_loan(loan: u64) -> ReturnBook {
    ReturnBook {
        loan_id: LoanId::from_u64(loan),
    }
}

// ============================================================================
// 基本シナリオ
// ============================================================================

#[tokio::test]
async fn test_full_loan_scenario() {
    let ledger = setup();
    let service = &ledger.service;

    // 蔵書登録
    let book = service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    assert_eq!(book.book_id.value(), 1);
    assert!(book.available);

    // 会員登録
    let member = service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    assert_eq!(member.member_id.value(), 1);

    // 貸出
    let loan = service.issue_book(issue(1, 1)).await.unwrap();
    assert_eq!(loan.loan_id.value(), 1);
    assert!(!loan.is_returned());
    assert_eq!(loan.issued_on, today());
    assert_eq!(loan.due_on, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert!(!service.list_books().await[0].available);

    // 二重貸出は不可
    let err = service.issue_book(issue(1, 1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::BookUnavailable(id) if id == BookId::FIRST));
    assert_eq!(err.kind(), ErrorKind::Unavailable);

    // 返却
    let returned = service.return_book(return_loan(1)).await.unwrap();
    assert!(returned.is_returned());
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.returned_on, Some(today()));
    assert!(service.list_books().await[0].available);

    // 二重返却はエラー
    let err = service.return_book(return_loan(1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyReturned(id) if id == LoanId::FIRST));
    assert_eq!(err.kind(), ErrorKind::AlreadyReturned);

    let loans = service.list_loans().await;
    assert_eq!(loans.len(), 1);
    assert!(loans[0].is_returned());
}

#[tokio::test]
async fn test_book_can_be_reissued_after_return() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service
        .add_member(add_member("Grace", "g@x.com", "556"))
        .await
        .unwrap();

    service.issue_book(issue(1, 1)).await.unwrap();
    service.return_book(return_loan(1)).await.unwrap();

    let second = service.issue_book(issue(1, 2)).await.unwrap();
    assert_eq!(second.loan_id.value(), 2);
    assert_eq!(second.member_id, MemberId::from_u64(2));
    assert_eq!(service.active_loans().await, vec![second]);
}

// ============================================================================
// 入力検証
// ============================================================================

#[tokio::test]
async fn test_add_book_with_blank_field_is_rejected_without_insert() {
    let ledger = setup();
    let service = &ledger.service;

    let err = service.add_book(add_book("", "A", "C")).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "title" }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = service
        .add_book(add_book("T", "A", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "category" }));

    assert!(service.list_books().await.is_empty());
    assert!(ledger.event_store.snapshot().is_empty());

    // 拒否された登録はIDを消費しない
    let book = service.add_book(add_book("T", "A", "C")).await.unwrap();
    assert_eq!(book.book_id, BookId::FIRST);
}

#[tokio::test]
async fn test_add_member_with_blank_field_is_rejected() {
    let ledger = setup();
    let service = &ledger.service;

    let err = service
        .add_member(add_member("Ada", "", "555"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "email" }));
    assert!(service.list_members().await.is_empty());
}

#[tokio::test]
async fn test_fields_are_trimmed() {
    let ledger = setup();
    let book = ledger
        .service
        .add_book(add_book("  Dune  ", " Herbert", "Scifi "))
        .await
        .unwrap();

    assert_eq!(book.title.as_str(), "Dune");
    assert_eq!(book.author.as_str(), "Herbert");
    assert_eq!(book.category.as_str(), "Scifi");
}

// ============================================================================
// 参照の解決
// ============================================================================

#[tokio::test]
async fn test_issue_book_with_unknown_ids_fails() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();

    let err = service.issue_book(issue(9, 1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::BookNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.issue_book(issue(1, 9)).await.unwrap_err();
    assert!(matches!(err, LedgerError::MemberNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // 書籍を先に確認する
    let err = service.issue_book(issue(9, 9)).await.unwrap_err();
    assert!(matches!(err, LedgerError::BookNotFound(_)));

    // 状態は変わらない
    assert!(service.list_loans().await.is_empty());
    assert!(service.list_books().await[0].available);
}

#[tokio::test]
async fn test_return_unknown_loan_fails() {
    let ledger = setup();
    let err = ledger
        .service
        .return_book(return_loan(1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::LoanNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unavailable_issue_leaves_ledger_unchanged() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service.issue_book(issue(1, 1)).await.unwrap();

    let books_before = service.list_books().await;
    let loans_before = service.list_loans().await;
    let journal_before = ledger.event_store.snapshot().len();

    for _ in 0..3 {
        let err = service.issue_book(issue(1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    assert_eq!(service.list_books().await, books_before);
    assert_eq!(service.list_loans().await, loans_before);
    assert_eq!(ledger.event_store.snapshot().len(), journal_before);
}

// ============================================================================
// ID採番
// ============================================================================

#[tokio::test]
async fn test_sequential_ids_are_strictly_increasing() {
    let ledger = setup();
    let mut ids = Vec::new();
    for i in 0..10 {
        let book = ledger
            .service
            .add_book(add_book(&format!("Book {}", i), "Author", "Category"))
            .await
            .unwrap();
        ids.push(book.book_id.value());
    }

    assert_eq!(ids, (1..=10).collect::<Vec<_>>());

    let listed: Vec<u64> = ledger
        .service
        .list_books()
        .await
        .iter()
        .map(|b| b.book_id.value())
        .collect();
    assert_eq!(listed, ids);
}

// ============================================================================
// 補助クエリ
// ============================================================================

#[tokio::test]
async fn test_dashboard_and_filtered_views() {
    let ledger = setup();
    let service = &ledger.service;

    assert_eq!(service.dashboard().await, Dashboard::default());

    for title in ["Dune", "Emma", "Ulysses"] {
        service
            .add_book(add_book(title, "Author", "Fiction"))
            .await
            .unwrap();
    }
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service
        .add_member(add_member("Grace", "g@x.com", "556"))
        .await
        .unwrap();

    service.issue_book(issue(1, 1)).await.unwrap();
    service.issue_book(issue(2, 2)).await.unwrap();
    service.return_book(return_loan(1)).await.unwrap();

    assert_eq!(
        service.dashboard().await,
        Dashboard {
            total_books: 3,
            total_members: 2,
            active_loans: 1,
            available_books: 2,
        }
    );

    let available: Vec<u64> = service
        .available_books()
        .await
        .iter()
        .map(|b| b.book_id.value())
        .collect();
    assert_eq!(available, vec![1, 3]);

    let active = service.active_loans().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].book_id, BookId::from_u64(2));
}

#[tokio::test]
async fn test_loan_details_join_titles_and_flag_overdue() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service.issue_book(issue(1, 1)).await.unwrap();

    let details = service.loan_details().await;
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].book_title.as_str(), "Dune");
    assert_eq!(details[0].member_name.as_str(), "Ada");
    assert!(!details[0].overdue);

    // 返却期限の翌日
    ledger.clock.advance_days(15);
    let details = service.loan_details().await;
    assert!(details[0].overdue);

    let returned = service.return_book(return_loan(1)).await.unwrap();
    assert_eq!(returned.returned_on, Some(ledger.clock.today()));
    assert!(!service.loan_details().await[0].overdue);
}

#[tokio::test]
async fn test_custom_loan_period() {
    let clock = Arc::new(FixedClock::new(today()));
    let service = LedgerService::new(ServiceDependencies {
        event_store: Arc::new(InMemoryEventStore::new()),
        clock,
        policy: LoanPolicy::new(7),
    });
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();

    let loan = service.issue_book(issue(1, 1)).await.unwrap();
    assert_eq!(loan.due_on, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
}

// ============================================================================
// ジャーナル
// ============================================================================

#[tokio::test]
async fn test_every_mutation_is_journaled_once() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service.issue_book(issue(1, 1)).await.unwrap();
    service.return_book(return_loan(1)).await.unwrap();
    let _ = service.return_book(return_loan(1)).await;

    let names: Vec<&str> = ledger
        .event_store
        .snapshot()
        .iter()
        .map(DomainEvent::name)
        .collect();
    assert_eq!(
        names,
        vec!["BookAdded", "MemberRegistered", "BookLoaned", "BookReturned"]
    );
}

#[tokio::test]
async fn test_restore_reproduces_ledger_and_continues_ids() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_book(add_book("Emma", "Austen", "Classic"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service.issue_book(issue(1, 1)).await.unwrap();
    service.issue_book(issue(2, 1)).await.unwrap();
    service.return_book(return_loan(1)).await.unwrap();

    let journal = Arc::new(InMemoryEventStore::with_events(
        ledger.event_store.snapshot(),
    ));
    let restored = LedgerService::restore(ServiceDependencies {
        event_store: journal,
        clock: Arc::new(FixedClock::new(today())),
        policy: LoanPolicy::default(),
    })
    .await
    .unwrap();

    assert_eq!(restored.list_books().await, service.list_books().await);
    assert_eq!(restored.list_members().await, service.list_members().await);
    assert_eq!(restored.list_loans().await, service.list_loans().await);

    // 復元後も貸出中の書籍は貸し出せない
    let err = restored.issue_book(issue(2, 1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);

    // IDは再利用されない
    let book = restored
        .add_book(add_book("Ulysses", "Joyce", "Modernist"))
        .await
        .unwrap();
    assert_eq!(book.book_id.value(), 3);
    let loan = restored.issue_book(issue(1, 1)).await.unwrap();
    assert_eq!(loan.loan_id.value(), 3);
}

#[tokio::test]
async fn test_failed_append_leaves_ledger_unchanged() {
    let store = Arc::new(FlakyEventStore::new());
    let service = LedgerService::new(ServiceDependencies {
        event_store: store.clone(),
        clock: Arc::new(FixedClock::new(today())),
        policy: LoanPolicy::default(),
    });
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();

    store.set_failing(true);

    let err = service.issue_book(issue(1, 1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::EventStoreError(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(service.list_books().await[0].available);
    assert!(service.list_loans().await.is_empty());

    let err = service
        .add_book(add_book("Emma", "Austen", "Classic"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(service.list_books().await.len(), 1);

    // 復旧後は同じIDで続行できる
    store.set_failing(false);
    let loan = service.issue_book(issue(1, 1)).await.unwrap();
    assert_eq!(loan.loan_id, LoanId::FIRST);
    assert_eq!(store.events().len(), 3);
}

#[tokio::test]
async fn test_restore_reports_journal_failure() {
    let store = Arc::new(FlakyEventStore::new());
    store.set_failing(true);

    let result = LedgerService::restore(ServiceDependencies {
        event_store: store,
        clock: Arc::new(FixedClock::new(today())),
        policy: LoanPolicy::default(),
    })
    .await;

    assert!(matches!(result, Err(LedgerError::EventStoreError(_))));
}

#[tokio::test]
async fn test_restore_rejects_inconsistent_journal() {
    let ledger = setup();
    let service = &ledger.service;
    service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();
    service
        .add_member(add_member("Ada", "a@x.com", "555"))
        .await
        .unwrap();
    service.issue_book(issue(1, 1)).await.unwrap();

    // 同じ書籍への2件目の貸出イベントを混入させる
    let mut events = ledger.event_store.snapshot();
    let mut duplicate = events.last().cloned().unwrap();
    if let DomainEvent::BookLoaned(e) = &mut duplicate {
        e.loan_id = LoanId::from_u64(2);
    }
    events.push(duplicate);

    let result = LedgerService::restore(ServiceDependencies {
        event_store: Arc::new(InMemoryEventStore::with_events(events)),
        clock: Arc::new(FixedClock::new(today())),
        policy: LoanPolicy::default(),
    })
    .await;

    let err = result.err().unwrap();
    assert!(matches!(err, LedgerError::Replay(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[tokio::test]
async fn test_restore_rejects_exhausted_id_without_panicking() {
    let ledger = setup();
    ledger
        .service
        .add_book(add_book("Dune", "Herbert", "Scifi"))
        .await
        .unwrap();

    let mut events = ledger.event_store.snapshot();
    if let Some(DomainEvent::BookAdded(e)) = events.first_mut() {
        e.book_id = BookId::from_u64(u64::MAX);
    }

    let result = LedgerService::restore(ServiceDependencies {
        event_store: Arc::new(InMemoryEventStore::with_events(events)),
        clock: Arc::new(FixedClock::new(today())),
        policy: LoanPolicy::default(),
    })
    .await;

    let err = result.err().unwrap();
    assert!(matches!(err, LedgerError::Replay(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);
}
