use serde::Serialize;
use thiserror::Error;

use crate::domain::{BookId, LoanId, MemberId, ReplayError, ValidationError};

/// 台帳アプリケーション層のエラー
///
/// いずれも変更前に検出されるため、エラー時に台帳の状態は変わらない。
#[derive(Debug, Error)]
pub enum LedgerError {
    /// 必須項目が空
    #[error("{field} must not be blank")]
    Validation { field: &'static str },

    /// 書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 会員が存在しない
    #[error("Member {0} not found")]
    MemberNotFound(MemberId),

    /// 貸出が存在しない
    #[error("Loan {0} not found")]
    LoanNotFound(LoanId),

    /// 書籍が貸出中
    #[error("Book {0} is not available for loan")]
    BookUnavailable(BookId),

    /// 既に返却済み
    #[error("Loan {0} is already returned")]
    AlreadyReturned(LoanId),

    /// EventStoreのエラー
    #[error("Event store error")]
    EventStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// ジャーナルからの復元に失敗
    #[error("Ledger replay failed: {0}")]
    Replay(#[from] ReplayError),
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Blank { field } => LedgerError::Validation { field },
        }
    }
}

/// エラー分類
///
/// 呼び出し側（表示層）が個々のバリアントに依存せずに分岐できるようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unavailable,
    AlreadyReturned,
    Storage,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation { .. } => ErrorKind::Validation,
            LedgerError::BookNotFound(_)
            | LedgerError::MemberNotFound(_)
            | LedgerError::LoanNotFound(_) => ErrorKind::NotFound,
            LedgerError::BookUnavailable(_) => ErrorKind::Unavailable,
            LedgerError::AlreadyReturned(_) => ErrorKind::AlreadyReturned,
            LedgerError::EventStoreError(_) | LedgerError::Replay(_) => ErrorKind::Storage,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LedgerError>;
