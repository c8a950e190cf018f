use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BookLoaned, BookReturned, IssueBookError, LoanId, MemberId, ReturnBookError,
    book::Book, member::Member,
};

/// 貸出期間（日数）の既定値
pub const LOAN_PERIOD_DAYS: u32 = 14;

/// 貸出ステータス
///
/// 状態遷移：Active → Returned のみ。Returnedは終端状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}

/// 貸出ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    period_days: u32,
}

impl LoanPolicy {
    pub fn new(period_days: u32) -> Self {
        Self { period_days }
    }

    /// 返却期限 = 貸出日 + 貸出期間
    pub fn due_on(&self, issued_on: NaiveDate) -> NaiveDate {
        issued_on + Duration::days(i64::from(self.period_days))
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self::new(LOAN_PERIOD_DAYS)
    }
}

/// 貸出 - 1冊の書籍の1回の貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        self.status.is_returned()
    }

    /// 延滞判定：未返却かつ返却期限を過ぎている
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_returned() && today > self.due_on
    }
}

impl From<BookLoaned> for Loan {
    fn from(event: BookLoaned) -> Self {
        Self {
            loan_id: event.loan_id,
            book_id: event.book_id,
            member_id: event.member_id,
            issued_on: event.issued_on,
            due_on: event.due_on,
            returned_on: None,
            status: LoanStatus::Active,
        }
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出中の書籍は貸し出せない
/// - 返却期限は貸出日 + 貸出期間
/// - 状態はActive
///
/// 書籍と会員は呼び出し側で解決済みであること。
/// 副作用なし。新しいLoanとイベントを返す。
pub fn issue_book(
    loan_id: LoanId,
    book: &Book,
    member: &Member,
    issued_on: NaiveDate,
    policy: LoanPolicy,
) -> Result<(Loan, BookLoaned), IssueBookError> {
    if !book.available {
        return Err(IssueBookError::BookUnavailable);
    }

    let event = BookLoaned {
        loan_id,
        book_id: book.book_id,
        member_id: member.member_id,
        issued_on,
        due_on: policy.due_on(issued_on),
    };

    Ok((Loan::from(event.clone()), event))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再度返却できない（二重返却はエラー）
/// - 延滞していても返却は受け付ける
///
/// 副作用なし。新しいLoanとイベントを返す。
pub fn return_book(
    loan: &Loan,
    returned_on: NaiveDate,
) -> Result<(Loan, BookReturned), ReturnBookError> {
    if loan.is_returned() {
        return Err(ReturnBookError::AlreadyReturned);
    }

    let event = BookReturned {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        member_id: loan.member_id,
        returned_on,
        was_overdue: loan.is_overdue(returned_on),
    };

    let returned = Loan {
        returned_on: Some(returned_on),
        status: LoanStatus::Returned,
        ..loan.clone()
    };

    Ok((returned, event))
}
