use serde::{Deserialize, Serialize};

use super::{MemberId, MemberRegistered, RequiredText, ValidationError, commands::AddMember};

/// 会員
///
/// 登録後は変更されない。メールアドレスと電話番号は書式を問わない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: RequiredText,
    pub email: RequiredText,
    pub phone: RequiredText,
}

/// 純粋関数：会員を登録する
///
/// 副作用なし。新しいMemberとイベントを返す。
pub fn register_member(
    member_id: MemberId,
    cmd: &AddMember,
) -> Result<(Member, MemberRegistered), ValidationError> {
    let event = MemberRegistered {
        member_id,
        name: RequiredText::parse("name", &cmd.name)?,
        email: RequiredText::parse("email", &cmd.email)?,
        phone: RequiredText::parse("phone", &cmd.phone)?,
    };

    Ok((Member::from(event.clone()), event))
}

impl From<MemberRegistered> for Member {
    fn from(event: MemberRegistered) -> Self {
        Self {
            member_id: event.member_id,
            name: event.name,
            email: event.email,
            phone: event.phone,
        }
    }
}
