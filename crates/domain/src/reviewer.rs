//! # レビュアー
//!
//! 書籍にレビューを書く人。削除するとそのレビューもすべて削除される。

use crate::{
    DomainError,
    author::{FirstName, LastName},
};

define_int_id! {
    /// レビュアー ID
    pub struct ReviewerId;
}

/// レビュアーエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    id:         ReviewerId,
    first_name: FirstName,
    last_name:  LastName,
}

impl Reviewer {
    pub fn from_db(id: ReviewerId, first_name: FirstName, last_name: LastName) -> Self {
        Self {
            id,
            first_name,
            last_name,
        }
    }

    pub fn id(&self) -> ReviewerId {
        self.id
    }

    pub fn first_name(&self) -> &FirstName {
        &self.first_name
    }

    pub fn last_name(&self) -> &LastName {
        &self.last_name
    }

    pub fn replaced(self, draft: NewReviewer) -> Self {
        Self {
            id:         self.id,
            first_name: draft.first_name,
            last_name:  draft.last_name,
        }
    }
}

/// 作成・更新用の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReviewer {
    pub first_name: FirstName,
    pub last_name:  LastName,
}

impl NewReviewer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            first_name: FirstName::new(first_name)?,
            last_name:  LastName::new(last_name)?,
        })
    }
}
