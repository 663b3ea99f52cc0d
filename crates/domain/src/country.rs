//! # 国
//!
//! 著者の出身国を表すマスタ。
//!
//! ## 不変条件
//!
//! - 国名は必須かつ 50 文字以内
//! - 国名は前後の空白を除去し大文字化した値で一意
//! - 著者から参照されている間は削除できない

use crate::DomainError;

define_int_id! {
    /// 国 ID
    pub struct CountryId;
}

define_validated_string! {
    /// 国名（1〜50 文字）
    pub struct CountryName {
        label: "国名",
        max_length: 50,
    }
}

/// 国エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    id:   CountryId,
    name: CountryName,
}

impl Country {
    /// 既存のデータから復元する
    pub fn from_db(id: CountryId, name: CountryName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> CountryId {
        self.id
    }

    pub fn name(&self) -> &CountryName {
        &self.name
    }

    /// 全項目を置き換えた新しいインスタンスを返す
    pub fn replaced(self, draft: NewCountry) -> Self {
        Self {
            id:   self.id,
            name: draft.name,
        }
    }
}

/// 作成・更新用の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCountry {
    pub name: CountryName,
}

impl NewCountry {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: CountryName::new(name)?,
        })
    }
}
