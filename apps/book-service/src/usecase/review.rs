//! レビューユースケース

use std::sync::Arc;

use bookshelf_domain::{
    book::{Book, BookId},
    integrity::EntityKind,
    review::{NewReview, Review, ReviewId},
    reviewer::ReviewerId,
};
use bookshelf_infra::{
    db::TransactionManager,
    repository::{BookRepository, ReviewRepository},
};
use bookshelf_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::{DeletionSummary, FindResultExt, IntegrityGuard, not_found},
};

/// レビューの作成・更新の入力
pub struct ReviewInput {
    pub headline:    String,
    pub review_text: String,
    pub rating:      i32,
    pub book_id:     BookId,
    pub reviewer_id: ReviewerId,
}

impl TryFrom<ReviewInput> for NewReview {
    type Error = CoreError;

    fn try_from(input: ReviewInput) -> Result<Self, Self::Error> {
        Ok(NewReview::new(
            input.headline,
            input.review_text,
            input.rating,
            input.book_id,
            input.reviewer_id,
        )?)
    }
}

/// レビューユースケース
pub struct ReviewUseCaseImpl {
    reviews:    Arc<dyn ReviewRepository>,
    books:      Arc<dyn BookRepository>,
    guard:      IntegrityGuard,
    tx_manager: Arc<dyn TransactionManager>,
}

impl ReviewUseCaseImpl {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        books: Arc<dyn BookRepository>,
        guard: IntegrityGuard,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            reviews,
            books,
            guard,
            tx_manager,
        }
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>, CoreError> {
        Ok(self.reviews.find_all().await?)
    }

    pub async fn get_review(&self, id: ReviewId) -> Result<Review, CoreError> {
        self.reviews
            .find_by_id(id)
            .await
            .or_not_found(EntityKind::Review, id)
    }

    /// レビュー対象の書籍
    pub async fn get_book_of_review(&self, id: ReviewId) -> Result<Book, CoreError> {
        self.books
            .find_by_review(id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Review, id))
    }

    /// 書籍に付いたレビュー一覧
    pub async fn list_reviews_of_book(&self, book_id: BookId) -> Result<Vec<Review>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Book, book_id.as_i32())
            .await?;
        Ok(self.reviews.find_by_book(book_id).await?)
    }

    /// レビューを作成する
    ///
    /// 対象の書籍、レビュアーの順に存在を確認する（いずれも 404）。
    pub async fn create_review(&self, input: ReviewInput) -> Result<Review, CoreError> {
        let draft = NewReview::try_from(input)?;
        self.ensure_references(&draft).await?;

        let mut tx = self.tx_manager.begin().await?;
        let review = self.reviews.insert(&mut tx, &draft).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::REVIEW_CREATED,
            event.entity_type = event::entity_type::REVIEW,
            event.entity_id = %review.id(),
            event.result = event::result::SUCCESS,
            "レビューを作成しました"
        );

        Ok(review)
    }

    /// レビューを更新する（全項目の置き換え）
    pub async fn update_review(
        &self,
        id: ReviewId,
        input: ReviewInput,
    ) -> Result<Review, CoreError> {
        let draft = NewReview::try_from(input)?;
        let existing = self.get_review(id).await?;
        self.ensure_references(&draft).await?;

        let review = existing.replaced(draft);
        let mut tx = self.tx_manager.begin().await?;
        self.reviews.update(&mut tx, &review).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::REVIEW_UPDATED,
            event.entity_type = event::entity_type::REVIEW,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "レビューを更新しました"
        );

        Ok(review)
    }

    pub async fn delete_review(&self, id: ReviewId) -> Result<DeletionSummary, CoreError> {
        let summary = self.guard.delete(EntityKind::Review, id.as_i32()).await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::REVIEW_DELETED,
            event.entity_type = event::entity_type::REVIEW,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "レビューを削除しました"
        );

        Ok(summary)
    }

    async fn ensure_references(&self, draft: &NewReview) -> Result<(), CoreError> {
        self.guard
            .ensure_exists(EntityKind::Book, draft.book_id.as_i32())
            .await?;
        self.guard
            .ensure_exists(EntityKind::Reviewer, draft.reviewer_id.as_i32())
            .await
    }
}

#[cfg(test)]
mod tests {
    use bookshelf_domain::{book::Book, reviewer::Reviewer};
    use bookshelf_infra::mock::{MockCatalog, MockTransactionManager};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::mock_usecases;

    fn setup() -> (ReviewUseCaseImpl, MockCatalog, MockTransactionManager, Book, Reviewer) {
        let (usecases, catalog, tx_manager) = mock_usecases();
        let japan = catalog.seed_country("Japan");
        let author = catalog.seed_author("Soseki", "Natsume", japan.id());
        let novel = catalog.seed_category("Novel");
        let book = catalog.seed_book("4101010013", "Kokoro", &[author.id()], &[novel.id()]);
        let reviewer = catalog.seed_reviewer("Taro", "Yamada");
        (usecases.review, catalog, tx_manager, book, reviewer)
    }

    fn input(rating: i32, book_id: BookId, reviewer_id: ReviewerId) -> ReviewInput {
        ReviewInput {
            headline: "名作".to_string(),
            review_text: "何度読んでも新しい発見がある。".to_string(),
            rating,
            book_id,
            reviewer_id,
        }
    }

    #[tokio::test]
    async fn test_レビューを作成できる() {
        let (sut, catalog, _, book, reviewer) = setup();

        let review = sut
            .create_review(input(5, book.id(), reviewer.id()))
            .await
            .unwrap();

        assert_eq!(review.rating().as_i32(), 5);
        assert_eq!(catalog.with_tables(|t| t.reviews.clone()), vec![review]);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[tokio::test]
    async fn test_範囲外の評価は400になる(#[case] rating: i32) {
        let (sut, _, tx_manager, book, reviewer) = setup();

        let err = sut
            .create_review(input(rating, book.id(), reviewer.id()))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::BadRequest(_)));
        assert_eq!(tx_manager.begun(), 0);
    }

    #[tokio::test]
    async fn test_存在しない書籍へのレビューは404になる() {
        let (sut, catalog, _, _, reviewer) = setup();

        let err = sut
            .create_review(input(3, BookId::new(999), reviewer.id()))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("書籍")));
        assert!(catalog.with_tables(|t| t.reviews.is_empty()));
    }

    #[tokio::test]
    async fn test_存在しないレビュアーによるレビューは404になる() {
        let (sut, _, _, book, _) = setup();

        let err = sut
            .create_review(input(3, book.id(), ReviewerId::new(999)))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("レビュアー")));
    }

    #[tokio::test]
    async fn test_レビューを更新できる() {
        let (sut, catalog, _, book, reviewer) = setup();
        let review = catalog.seed_review(book.id(), reviewer.id(), 2);

        let updated = sut
            .update_review(review.id(), input(4, book.id(), reviewer.id()))
            .await
            .unwrap();

        assert_eq!(updated.rating().as_i32(), 4);
        assert_eq!(updated.headline().as_str(), "名作");
        assert_eq!(catalog.with_tables(|t| t.reviews[0].rating().as_i32()), 4);
    }

    #[tokio::test]
    async fn test_存在しないレビューの更新は404になる() {
        let (sut, _, _, book, reviewer) = setup();

        let err = sut
            .update_review(ReviewId::new(999), input(4, book.id(), reviewer.id()))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("レビュー")));
    }

    #[tokio::test]
    async fn test_レビューから書籍を引ける() {
        let (sut, catalog, _, book, reviewer) = setup();
        let review = catalog.seed_review(book.id(), reviewer.id(), 3);

        assert_eq!(sut.get_book_of_review(review.id()).await.unwrap(), book);
        assert_eq!(sut.list_reviews_of_book(book.id()).await.unwrap(), vec![review]);
        assert!(matches!(
            sut.get_book_of_review(ReviewId::new(999)).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_レビューを削除できる() {
        let (sut, catalog, _, book, reviewer) = setup();
        let review = catalog.seed_review(book.id(), reviewer.id(), 3);

        let summary = sut.delete_review(review.id()).await.unwrap();

        assert!(summary.cascaded.is_empty());
        assert!(catalog.with_tables(|t| t.reviews.is_empty()));
        assert_eq!(catalog.with_tables(|t| t.books.len()), 1);
    }
}
