use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MemberId, RequiredText};

/// イベント：蔵書が登録された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAdded {
    pub book_id: BookId,
    pub title: RequiredText,
    pub author: RequiredText,
    pub category: RequiredText,
}

/// イベント：会員が登録された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRegistered {
    pub member_id: MemberId,
    pub name: RequiredText,
    pub email: RequiredText,
    pub phone: RequiredText,
}

/// イベント：書籍が貸出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLoaned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub returned_on: NaiveDate,
    pub was_overdue: bool,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    BookAdded(BookAdded),
    MemberRegistered(MemberRegistered),
    BookLoaned(BookLoaned),
    BookReturned(BookReturned),
}

impl DomainEvent {
    /// イベント種別名（ログ出力用）
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::BookAdded(_) => "BookAdded",
            DomainEvent::MemberRegistered(_) => "MemberRegistered",
            DomainEvent::BookLoaned(_) => "BookLoaned",
            DomainEvent::BookReturned(_) => "BookReturned",
        }
    }
}
