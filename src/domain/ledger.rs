use std::collections::BTreeMap;

use super::{
    BookId, DomainEvent, IdSequence, LoanId, LoanStatus, MemberId, ReplayError, book::Book,
    loan::Loan, member::Member,
};

/// 台帳 - 蔵書・会員・貸出の唯一の所有者
///
/// 不変条件：
/// - 書籍1冊につき未返却の貸出は高々1件（`available == false` ⇔ 未返却の貸出あり）
/// - 貸出が参照する書籍・会員は必ず存在する
/// - IDは種別ごとに単調増加し、再利用されない
///
/// 状態の変更は`apply`経由のみ。`apply`は検証をすべて終えてから変更するため、
/// エラー時に状態が部分的に変わることはない。
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    books: BTreeMap<BookId, Book>,
    members: BTreeMap<MemberId, Member>,
    loans: BTreeMap<LoanId, Loan>,
    book_ids: IdSequence<BookId>,
    member_ids: IdSequence<MemberId>,
    loan_ids: IdSequence<LoanId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// イベント列から台帳を復元する
    ///
    /// foldパターンで各イベントを順次適用する。
    /// 不変条件に違反するイベントがあれば`ReplayError`を返す。
    pub fn replay<'a, I>(events: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = &'a DomainEvent>,
    {
        events.into_iter().try_fold(Self::new(), |mut ledger, event| {
            ledger.apply(event)?;
            Ok(ledger)
        })
    }

    pub fn next_book_id(&self) -> BookId {
        self.book_ids.peek()
    }

    pub fn next_member_id(&self) -> MemberId {
        self.member_ids.peek()
    }

    pub fn next_loan_id(&self) -> LoanId {
        self.loan_ids.peek()
    }

    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.get(&member_id)
    }

    pub fn loan(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.get(&loan_id)
    }

    /// 登録順（ID順）の蔵書
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// 書籍の未返却の貸出
    pub fn active_loan_for(&self, book_id: BookId) -> Option<&Loan> {
        self.loans
            .values()
            .find(|loan| loan.book_id == book_id && !loan.is_returned())
    }

    /// イベントを適用する
    ///
    /// 新しいIDは採番器の次のID以上でなければならない（飛び番は可、逆行は不可）。
    pub fn apply(&mut self, event: &DomainEvent) -> Result<(), ReplayError> {
        match event {
            DomainEvent::BookAdded(e) => {
                if self.books.contains_key(&e.book_id) {
                    return Err(ReplayError::DuplicateBook(e.book_id));
                }
                if e.book_id < self.book_ids.peek() {
                    return Err(ReplayError::OutOfOrderBook {
                        id: e.book_id,
                        expected: self.book_ids.peek(),
                    });
                }
                self.book_ids.advance_past(e.book_id)?;
                self.books.insert(e.book_id, Book::from(e.clone()));
            }

            DomainEvent::MemberRegistered(e) => {
                if self.members.contains_key(&e.member_id) {
                    return Err(ReplayError::DuplicateMember(e.member_id));
                }
                if e.member_id < self.member_ids.peek() {
                    return Err(ReplayError::OutOfOrderMember {
                        id: e.member_id,
                        expected: self.member_ids.peek(),
                    });
                }
                self.member_ids.advance_past(e.member_id)?;
                self.members.insert(e.member_id, Member::from(e.clone()));
            }

            DomainEvent::BookLoaned(e) => {
                if self.loans.contains_key(&e.loan_id) {
                    return Err(ReplayError::DuplicateLoan(e.loan_id));
                }
                if e.loan_id < self.loan_ids.peek() {
                    return Err(ReplayError::OutOfOrderLoan {
                        id: e.loan_id,
                        expected: self.loan_ids.peek(),
                    });
                }
                if !self.members.contains_key(&e.member_id) {
                    return Err(ReplayError::UnknownMember(e.member_id));
                }
                let book = self
                    .books
                    .get(&e.book_id)
                    .ok_or(ReplayError::UnknownBook(e.book_id))?;
                if !book.available {
                    return Err(ReplayError::BookAlreadyOnLoan(e.book_id));
                }
                debug_assert!(
                    self.active_loan_for(e.book_id).is_none(),
                    "book {} is flagged available but has an active loan",
                    e.book_id
                );

                self.loan_ids.advance_past(e.loan_id)?;
                // 貸出記録と書籍の貸出状態は同じ手順で更新する
                if let Some(book) = self.books.get_mut(&e.book_id) {
                    book.available = false;
                }
                self.loans.insert(e.loan_id, Loan::from(e.clone()));
            }

            DomainEvent::BookReturned(e) => {
                let loan = self
                    .loans
                    .get(&e.loan_id)
                    .ok_or(ReplayError::UnknownLoan(e.loan_id))?;
                if loan.is_returned() {
                    return Err(ReplayError::LoanAlreadyReturned(e.loan_id));
                }
                if loan.book_id != e.book_id || loan.member_id != e.member_id {
                    return Err(ReplayError::LoanMismatch(e.loan_id));
                }
                if !self.books.contains_key(&loan.book_id) {
                    return Err(ReplayError::UnknownBook(loan.book_id));
                }
                debug_assert_eq!(
                    self.active_loan_for(loan.book_id).map(|active| active.loan_id),
                    Some(e.loan_id)
                );

                if let Some(loan) = self.loans.get_mut(&e.loan_id) {
                    loan.status = LoanStatus::Returned;
                    loan.returned_on = Some(e.returned_on);
                }
                if let Some(book) = self.books.get_mut(&e.book_id) {
                    book.available = true;
                }
            }
        }

        Ok(())
    }
}
