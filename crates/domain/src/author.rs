//! # 著者
//!
//! 書籍の著者。必ず 1 つの国に所属し、書籍とは多対多で関連する。
//!
//! ## 不変条件
//!
//! - 名は 100 文字以内、姓は 200 文字以内（いずれも必須）
//! - `country_id` は実在する国を指す（ユースケース層で検証する）

use crate::{DomainError, country::CountryId};

define_int_id! {
    /// 著者 ID
    pub struct AuthorId;
}

define_validated_string! {
    /// 名（1〜100 文字）
    ///
    /// 著者とレビュアーで共用する。
    pub struct FirstName {
        label: "名",
        max_length: 100,
    }
}

define_validated_string! {
    /// 姓（1〜200 文字）
    pub struct LastName {
        label: "姓",
        max_length: 200,
    }
}

/// 著者エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id:         AuthorId,
    first_name: FirstName,
    last_name:  LastName,
    country_id: CountryId,
}

impl Author {
    pub fn from_db(
        id: AuthorId,
        first_name: FirstName,
        last_name: LastName,
        country_id: CountryId,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            country_id,
        }
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    pub fn first_name(&self) -> &FirstName {
        &self.first_name
    }

    pub fn last_name(&self) -> &LastName {
        &self.last_name
    }

    pub fn country_id(&self) -> CountryId {
        self.country_id
    }

    pub fn replaced(self, draft: NewAuthor) -> Self {
        Self {
            id:         self.id,
            first_name: draft.first_name,
            last_name:  draft.last_name,
            country_id: draft.country_id,
        }
    }
}

/// 作成・更新用の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub first_name: FirstName,
    pub last_name:  LastName,
    pub country_id: CountryId,
}

impl NewAuthor {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        country_id: CountryId,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            first_name: FirstName::new(first_name)?,
            last_name: LastName::new(last_name)?,
            country_id,
        })
    }
}
