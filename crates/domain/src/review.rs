//! # レビュー
//!
//! レビュアーが書籍に付ける評価。書籍とレビュアーの両方を外部キーで参照する。
//!
//! ## 不変条件
//!
//! - 見出しは 200 文字以内、本文は 2000 文字以内（いずれも必須）
//! - 評価は 1〜5
//! - `book_id` と `reviewer_id` は実在するレコードを指す（ユースケース層で検証する）

use serde::{Deserialize, Serialize};

use crate::{DomainError, book::BookId, reviewer::ReviewerId};

define_int_id! {
    /// レビュー ID
    pub struct ReviewId;
}

define_validated_string! {
    /// 見出し（1〜200 文字）
    pub struct Headline {
        label: "見出し",
        max_length: 200,
    }
}

define_validated_string! {
    /// レビュー本文（1〜2000 文字）
    pub struct ReviewText {
        label: "レビュー本文",
        max_length: 2000,
    }
}

/// 評価（1〜5）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::Validation(format!(
                "評価は {} 〜 {} の範囲で指定してください",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

/// レビューエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    id:          ReviewId,
    headline:    Headline,
    review_text: ReviewText,
    rating:      Rating,
    book_id:     BookId,
    reviewer_id: ReviewerId,
}

impl Review {
    pub fn from_db(id: ReviewId, draft: NewReview) -> Self {
        Self {
            id,
            headline: draft.headline,
            review_text: draft.review_text,
            rating: draft.rating,
            book_id: draft.book_id,
            reviewer_id: draft.reviewer_id,
        }
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn headline(&self) -> &Headline {
        &self.headline
    }

    pub fn review_text(&self) -> &ReviewText {
        &self.review_text
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn reviewer_id(&self) -> ReviewerId {
        self.reviewer_id
    }

    pub fn replaced(self, draft: NewReview) -> Self {
        Self::from_db(self.id, draft)
    }
}

/// 作成・更新用の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub headline:    Headline,
    pub review_text: ReviewText,
    pub rating:      Rating,
    pub book_id:     BookId,
    pub reviewer_id: ReviewerId,
}

impl NewReview {
    pub fn new(
        headline: impl Into<String>,
        review_text: impl Into<String>,
        rating: i32,
        book_id: BookId,
        reviewer_id: ReviewerId,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            headline: Headline::new(headline)?,
            review_text: ReviewText::new(review_text)?,
            rating: Rating::new(rating)?,
            book_id,
            reviewer_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn test_評価は1から5を受け付ける(#[case] value: i32) {
        assert_eq!(Rating::new(value).unwrap().as_i32(), value);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    fn test_評価が範囲外ならバリデーションエラー(#[case] value: i32) {
        assert!(matches!(Rating::new(value), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_本文は2000文字まで() {
        assert!(ReviewText::new("r".repeat(2000)).is_ok());
        assert!(ReviewText::new("r".repeat(2001)).is_err());
    }

    #[test]
    fn test_見出しが空ならバリデーションエラー() {
        let result = NewReview::new("", "本文", 3, BookId::new(1), ReviewerId::new(1));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
