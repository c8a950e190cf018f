use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ReplayError, ValidationError};

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// 最初に払い出されるID
            pub const FIRST: Self = Self(1);

            pub fn from_u64(value: u64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> u64 {
                self.0
            }

            /// 次のID（単調増加）。`u64::MAX`の次は存在しない
            pub fn next(&self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequential_id!(
    /// 書籍ID - 蔵書登録時に採番される
    BookId
);

sequential_id!(
    /// 会員ID - 会員登録時に採番される
    MemberId
);

sequential_id!(
    /// 貸出ID - 貸出時に採番される
    LoanId
);

/// IDの採番器
///
/// 不変条件：払い出したIDは単調増加し、プロセスの生存期間中に再利用されない。
/// 次に払い出すIDを保持するだけで、採番の確定は`advance_past`で行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSequence<T> {
    next: T,
}

macro_rules! impl_sequence {
    ($id:ident, $kind:literal) => {
        impl IdSequence<$id> {
            pub fn new() -> Self {
                Self { next: $id::FIRST }
            }

            /// 次に払い出すID（採番は確定しない）
            pub fn peek(&self) -> $id {
                self.next
            }

            /// 使用済みIDを記録し、以降はそれより大きいIDを払い出す
            ///
            /// # エラー
            /// 次のIDが表現できない場合は`ReplayError::IdExhausted`（採番器は変更しない）
            pub fn advance_past(&mut self, used: $id) -> Result<(), ReplayError> {
                if used >= self.next {
                    self.next = used.next().ok_or(ReplayError::IdExhausted {
                        kind: $kind,
                        id: used.value(),
                    })?;
                }
                Ok(())
            }
        }

        impl Default for IdSequence<$id> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

impl_sequence!(BookId, "book");
impl_sequence!(MemberId, "member");
impl_sequence!(LoanId, "loan");

/// 必須テキスト項目
///
/// 不変条件：前後の空白を除去済みで、空文字列ではない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequiredText(String);

impl RequiredText {
    /// 前後の空白を除去して生成する
    ///
    /// # エラー
    /// 除去後に空の場合は`ValidationError::Blank`（項目名付き）を返す
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Blank { field });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RequiredText {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse("text", &value)
    }
}

impl From<RequiredText> for String {
    fn from(value: RequiredText) -> Self {
        value.0
    }
}

impl fmt::Display for RequiredText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
