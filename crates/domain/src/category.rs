//! # カテゴリ
//!
//! 書籍の分類。書籍とは多対多で関連する。
//!
//! 書籍から参照されている間は削除できない。

use crate::DomainError;

define_int_id! {
    /// カテゴリ ID
    pub struct CategoryId;
}

define_validated_string! {
    /// カテゴリ名（1〜50 文字）
    pub struct CategoryName {
        label: "カテゴリ名",
        max_length: 50,
    }
}

/// カテゴリエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id:   CategoryId,
    name: CategoryName,
}

impl Category {
    pub fn from_db(id: CategoryId, name: CategoryName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    pub fn replaced(self, draft: NewCategory) -> Self {
        Self {
            id:   self.id,
            name: draft.name,
        }
    }
}

/// 作成・更新用の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: CategoryName,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: CategoryName::new(name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_カテゴリ名が空ならバリデーションエラー() {
        assert!(matches!(
            NewCategory::new(" "),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_カテゴリ名の上限は50文字() {
        assert!(CategoryName::new("x".repeat(50)).is_ok());
        assert!(CategoryName::new("x".repeat(51)).is_err());
    }
}
