use serde::{Deserialize, Serialize};

use super::{BookAdded, BookId, RequiredText, ValidationError, commands::AddBook};

/// 蔵書
///
/// `available`は貸出状態の唯一の記録。貸出・返却と同じ手順で更新される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: RequiredText,
    pub author: RequiredText,
    pub category: RequiredText,
    pub available: bool,
}

/// 純粋関数：蔵書を登録する
///
/// ビジネスルール：
/// - タイトル・著者・分類はすべて必須（前後の空白は除去）
/// - 登録直後は貸出可能
///
/// 副作用なし。新しいBookとイベントを返す。
pub fn add_book(book_id: BookId, cmd: &AddBook) -> Result<(Book, BookAdded), ValidationError> {
    let title = RequiredText::parse("title", &cmd.title)?;
    let author = RequiredText::parse("author", &cmd.author)?;
    let category = RequiredText::parse("category", &cmd.category)?;

    let event = BookAdded {
        book_id,
        title,
        author,
        category,
    };

    Ok((Book::from(event.clone()), event))
}

impl From<BookAdded> for Book {
    fn from(event: BookAdded) -> Self {
        Self {
            book_id: event.book_id,
            title: event.title,
            author: event.author,
            category: event.category,
            available: true,
        }
    }
}
