use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{RequiredText, ledger::Ledger, loan::Loan};

/// 貸出一覧の表示用ビュー
///
/// 書籍タイトルと会員名を結合済み。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub book_title: RequiredText,
    pub member_name: RequiredText,
    pub overdue: bool,
}

impl LoanDetails {
    /// 台帳の全貸出をビューに変換する（貸出ID順）
    pub(super) fn collect(ledger: &Ledger, today: NaiveDate) -> Vec<Self> {
        ledger
            .loans()
            .filter_map(|loan| {
                let book = ledger.book(loan.book_id)?;
                let member = ledger.member(loan.member_id)?;
                Some(Self {
                    loan: loan.clone(),
                    book_title: book.title.clone(),
                    member_name: member.name.clone(),
                    overdue: loan.is_overdue(today),
                })
            })
            .collect()
    }
}

/// ダッシュボードの集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Dashboard {
    pub total_books: usize,
    pub total_members: usize,
    pub active_loans: usize,
    pub available_books: usize,
}

impl Dashboard {
    pub(super) fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            total_books: ledger.books().count(),
            total_members: ledger.members().count(),
            active_loans: ledger.loans().filter(|l| !l.is_returned()).count(),
            available_books: ledger.books().filter(|b| b.available).count(),
        }
    }
}
