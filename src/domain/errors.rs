use thiserror::Error;

use super::{BookId, LoanId, MemberId};

/// 入力検証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必須項目が空（前後の空白を除去した結果を含む）
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
}

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueBookError {
    /// 書籍が貸出中
    BookUnavailable,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 既に返却済み
    AlreadyReturned,
}

/// イベント再生のエラー
///
/// ジャーナルの内容が台帳の不変条件に違反している場合に発生する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("book {0} was added twice")]
    DuplicateBook(BookId),

    #[error("member {0} was registered twice")]
    DuplicateMember(MemberId),

    #[error("loan {0} was issued twice")]
    DuplicateLoan(LoanId),

    #[error("event references unknown book {0}")]
    UnknownBook(BookId),

    #[error("event references unknown member {0}")]
    UnknownMember(MemberId),

    #[error("event references unknown loan {0}")]
    UnknownLoan(LoanId),

    #[error("book {0} is already on loan")]
    BookAlreadyOnLoan(BookId),

    #[error("loan {0} is already returned")]
    LoanAlreadyReturned(LoanId),

    #[error("book {id} is out of order, expected at least {expected}")]
    OutOfOrderBook { id: BookId, expected: BookId },

    #[error("member {id} is out of order, expected at least {expected}")]
    OutOfOrderMember { id: MemberId, expected: MemberId },

    #[error("loan {id} is out of order, expected at least {expected}")]
    OutOfOrderLoan { id: LoanId, expected: LoanId },

    #[error("return of loan {0} names a different book or member")]
    LoanMismatch(LoanId),

    #[error("{kind} id {id} leaves no room for the next id")]
    IdExhausted { kind: &'static str, id: u64 },
}
