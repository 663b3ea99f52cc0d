//! # 書籍
//!
//! カタログの中心となるエンティティ。著者・カテゴリとは関連テーブル経由で
//! 多対多に結び付き、レビューからは外部キーで参照される。
//!
//! ## 不変条件
//!
//! - ISBN は必須かつ 32 文字以内で、正規化後の値で一意
//! - タイトルは必須かつ 200 文字以内
//! - 作成・更新時に 1 人以上の著者と 1 つ以上のカテゴリを持つ
//!   （[`BookAssociations`] が保証する）
//! - 削除するとレビューと関連行もすべて削除される
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bookshelf_domain::{
//!     author::AuthorId,
//!     book::{BookAssociations, NewBook},
//!     category::CategoryId,
//! };
//!
//! let draft = NewBook::new("978-4-00-310101-8", "吾輩は猫である", None)?;
//! let links = BookAssociations::new(
//!     vec![AuthorId::new(1), AuthorId::new(1)],
//!     vec![CategoryId::new(2)],
//! )?;
//!
//! assert_eq!(draft.isbn.as_str(), "978-4-00-310101-8");
//! assert_eq!(links.author_ids(), &[AuthorId::new(1)]);
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DomainError, author::AuthorId, category::CategoryId};

define_int_id! {
    /// 書籍 ID
    pub struct BookId;
}

define_validated_string! {
    /// 書籍タイトル（1〜200 文字）
    pub struct BookTitle {
        label: "タイトル",
        max_length: 200,
    }
}

define_validated_string! {
    /// ISBN（1〜32 文字）
    ///
    /// 表記揺れ（ハイフン有無など）はそのまま保持し、一意性は正規化後の値で判定する。
    pub struct Isbn {
        label: "ISBN",
        max_length: 32,
    }
}

/// 書籍エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id:             BookId,
    isbn:           Isbn,
    title:          BookTitle,
    date_published: Option<NaiveDate>,
}

impl Book {
    pub fn from_db(
        id: BookId,
        isbn: Isbn,
        title: BookTitle,
        date_published: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            isbn,
            title,
            date_published,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    pub fn date_published(&self) -> Option<NaiveDate> {
        self.date_published
    }

    pub fn replaced(self, draft: NewBook) -> Self {
        Self {
            id:             self.id,
            isbn:           draft.isbn,
            title:          draft.title,
            date_published: draft.date_published,
        }
    }
}

/// 作成・更新用の入力（書籍本体）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn:           Isbn,
    pub title:          BookTitle,
    pub date_published: Option<NaiveDate>,
}

impl NewBook {
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        date_published: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            isbn: Isbn::new(isbn)?,
            title: BookTitle::new(title)?,
            date_published,
        })
    }
}

/// 書籍に紐付ける著者・カテゴリの集合
///
/// 空のリストは受け付けない。重複した ID は最初の出現順を保って 1 つにまとめる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAssociations {
    author_ids:   Vec<AuthorId>,
    category_ids: Vec<CategoryId>,
}

impl BookAssociations {
    pub fn new(
        author_ids: Vec<AuthorId>,
        category_ids: Vec<CategoryId>,
    ) -> Result<Self, DomainError> {
        if author_ids.is_empty() {
            return Err(DomainError::Validation(
                "著者を 1 人以上指定してください".to_string(),
            ));
        }
        if category_ids.is_empty() {
            return Err(DomainError::Validation(
                "カテゴリを 1 つ以上指定してください".to_string(),
            ));
        }

        Ok(Self {
            author_ids:   dedup_preserving_order(author_ids),
            category_ids: dedup_preserving_order(category_ids),
        })
    }

    pub fn author_ids(&self) -> &[AuthorId] {
        &self.author_ids
    }

    pub fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }
}

fn dedup_preserving_order<T: Copy + Eq + std::hash::Hash>(ids: Vec<T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// 書籍の平均評価
///
/// レビューが 1 件もない場合は 0 とする。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BookRating(f64);

impl BookRating {
    /// 評価値の一覧から平均を計算する
    pub fn average_of(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self(0.0);
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        Self(sum as f64 / ratings.len() as f64)
    }

    /// DB で集計済みの平均値から作成する（`AVG` は行がないと NULL を返す）
    pub fn from_average(average: Option<f64>) -> Self {
        Self(average.unwrap_or(0.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
