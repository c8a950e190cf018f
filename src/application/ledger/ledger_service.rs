use crate::domain::{
    self, DomainEvent, IssueBookError, ReturnBookError,
    book::Book,
    commands::*,
    ledger::Ledger,
    loan::{Loan, LoanPolicy},
    member::Member,
};
use crate::ports::{Clock, EventStore};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::{LedgerError, Result};
use super::views::{Dashboard, LoanDetails};

/// サービスの依存関係
///
/// すべての依存を明示的なデータ構造として渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub event_store: Arc<dyn EventStore>,
    pub clock: Arc<dyn Clock>,
    pub policy: LoanPolicy,
}

/// 台帳サービス - 表示層から呼ばれる唯一の窓口
///
/// 蔵書・会員・貸出の3つのコレクションを1つのロックで保護する。
/// 各操作は「検証 → イベント追記 → 状態への適用」をロックを保持したまま行うため、
/// 同じ書籍・貸出に対する並行した貸出・返却が交錯することはない。
pub struct LedgerService {
    deps: ServiceDependencies,
    ledger: Mutex<Ledger>,
}

impl LedgerService {
    /// 空の台帳で開始する
    ///
    /// イベントストアが空であることを前提とする。既存のジャーナルがある場合は`restore`を使う。
    pub fn new(deps: ServiceDependencies) -> Self {
        Self {
            deps,
            ledger: Mutex::new(Ledger::new()),
        }
    }

    /// イベントストアのジャーナルから台帳を復元する
    ///
    /// # エラー
    /// - EventStoreError: イベント読み込み失敗
    /// - Replay: ジャーナルが台帳の不変条件に違反している
    pub async fn restore(deps: ServiceDependencies) -> Result<Self> {
        let mut ledger = Ledger::new();
        let mut replayed = 0usize;
        {
            let mut events = deps.event_store.stream_all();
            while let Some(event) = events
                .try_next()
                .await
                .map_err(LedgerError::EventStoreError)?
            {
                ledger.apply(&event)?;
                replayed += 1;
            }
        }

        tracing::info!(
            events = replayed,
            books = ledger.books().count(),
            members = ledger.members().count(),
            loans = ledger.loans().count(),
            "Ledger restored from journal"
        );

        Ok(Self {
            deps,
            ledger: Mutex::new(ledger),
        })
    }

    /// 蔵書を登録する
    ///
    /// ビジネスルール：
    /// - タイトル・著者・分類は必須（前後の空白を除去して判定）
    /// - 登録直後は貸出可能
    pub async fn add_book(&self, cmd: AddBook) -> Result<Book> {
        let mut ledger = self.ledger.lock().await;

        let (book, event) = domain::book::add_book(ledger.next_book_id(), &cmd)
            .map_err(|e| rejected("add_book", e.into()))?;
        self.commit(&mut ledger, DomainEvent::BookAdded(event))
            .await?;

        tracing::info!(book_id = %book.book_id, title = %book.title, "Book added");
        Ok(book)
    }

    /// 会員を登録する
    pub async fn add_member(&self, cmd: AddMember) -> Result<Member> {
        let mut ledger = self.ledger.lock().await;

        let (member, event) = domain::member::register_member(ledger.next_member_id(), &cmd)
            .map_err(|e| rejected("add_member", e.into()))?;
        self.commit(&mut ledger, DomainEvent::MemberRegistered(event))
            .await?;

        tracing::info!(member_id = %member.member_id, name = %member.name, "Member registered");
        Ok(member)
    }

    /// 書籍を貸し出す
    ///
    /// ビジネスルール：
    /// - 書籍と会員が存在すること（書籍を先に確認）
    /// - 書籍が貸出可能であること
    /// - 返却期限は今日 + 貸出期間
    ///
    /// 貸出可能性の確認から書籍状態の更新までを1つのロック区間で行う。
    pub async fn issue_book(&self, cmd: IssueBook) -> Result<Loan> {
        let mut ledger = self.ledger.lock().await;

        let book = ledger
            .book(cmd.book_id)
            .ok_or_else(|| rejected("issue_book", LedgerError::BookNotFound(cmd.book_id)))?;
        let member = ledger
            .member(cmd.member_id)
            .ok_or_else(|| rejected("issue_book", LedgerError::MemberNotFound(cmd.member_id)))?;

        let (loan, event) = domain::loan::issue_book(
            ledger.next_loan_id(),
            book,
            member,
            self.deps.clock.today(),
            self.deps.policy,
        )
        .map_err(|e| match e {
            IssueBookError::BookUnavailable => {
                rejected("issue_book", LedgerError::BookUnavailable(cmd.book_id))
            }
        })?;

        self.commit(&mut ledger, DomainEvent::BookLoaned(event))
            .await?;

        tracing::info!(
            loan_id = %loan.loan_id,
            book_id = %loan.book_id,
            member_id = %loan.member_id,
            due_on = %loan.due_on,
            "Book issued"
        );
        Ok(loan)
    }

    /// 書籍を返却する
    ///
    /// ビジネスルール：
    /// - 貸出が存在すること
    /// - 返却済みの貸出は再度返却できない（二重返却はエラー）
    /// - 延滞していても返却は受け付ける
    pub async fn return_book(&self, cmd: ReturnBook) -> Result<Loan> {
        let mut ledger = self.ledger.lock().await;

        let loan = ledger
            .loan(cmd.loan_id)
            .ok_or_else(|| rejected("return_book", LedgerError::LoanNotFound(cmd.loan_id)))?;

        let (returned, event) = domain::loan::return_book(loan, self.deps.clock.today())
            .map_err(|e| match e {
                ReturnBookError::AlreadyReturned => {
                    rejected("return_book", LedgerError::AlreadyReturned(cmd.loan_id))
                }
            })?;
        let was_overdue = event.was_overdue;

        self.commit(&mut ledger, DomainEvent::BookReturned(event))
            .await?;

        tracing::info!(
            loan_id = %returned.loan_id,
            book_id = %returned.book_id,
            was_overdue,
            "Book returned"
        );
        Ok(returned)
    }

    /// 全蔵書（登録順）
    pub async fn list_books(&self) -> Vec<Book> {
        self.ledger.lock().await.books().cloned().collect()
    }

    /// 全会員（登録順）
    pub async fn list_members(&self) -> Vec<Member> {
        self.ledger.lock().await.members().cloned().collect()
    }

    /// 全貸出（貸出順）
    pub async fn list_loans(&self) -> Vec<Loan> {
        self.ledger.lock().await.loans().cloned().collect()
    }

    /// 貸出可能な蔵書
    pub async fn available_books(&self) -> Vec<Book> {
        self.ledger
            .lock()
            .await
            .books()
            .filter(|b| b.available)
            .cloned()
            .collect()
    }

    /// 未返却の貸出
    pub async fn active_loans(&self) -> Vec<Loan> {
        self.ledger
            .lock()
            .await
            .loans()
            .filter(|l| !l.is_returned())
            .cloned()
            .collect()
    }

    /// 書籍タイトル・会員名を結合した貸出一覧
    pub async fn loan_details(&self) -> Vec<LoanDetails> {
        let ledger = self.ledger.lock().await;
        LoanDetails::collect(&ledger, self.deps.clock.today())
    }

    pub async fn dashboard(&self) -> Dashboard {
        Dashboard::from_ledger(&*self.ledger.lock().await)
    }

    /// イベントを追記してから台帳に適用する
    ///
    /// 追記に失敗した場合は台帳を変更しない。
    async fn commit(&self, ledger: &mut Ledger, event: DomainEvent) -> Result<()> {
        let name = event.name();

        self.deps
            .event_store
            .append(vec![event.clone()])
            .await
            .map_err(|e| {
                tracing::error!("Event store error while appending {}: {}", name, e);
                LedgerError::EventStoreError(e)
            })?;

        // 検証済みのイベントなので適用は失敗しない想定
        ledger.apply(&event).map_err(|e| {
            tracing::error!("Journaled {} could not be applied: {}", name, e);
            LedgerError::from(e)
        })?;

        tracing::debug!(event = name, "Event committed");
        Ok(())
    }
}

/// 呼び出し側の入力に起因する拒否をログに残す
fn rejected(operation: &'static str, err: LedgerError) -> LedgerError {
    tracing::warn!(operation, kind = ?err.kind(), "Command rejected: {}", err);
    err
}
