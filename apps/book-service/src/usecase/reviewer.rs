//! レビュアーユースケース

use std::sync::Arc;

use bookshelf_domain::{
    integrity::EntityKind,
    review::{Review, ReviewId},
    reviewer::{NewReviewer, Reviewer, ReviewerId},
};
use bookshelf_infra::{
    db::TransactionManager,
    repository::{ReviewRepository, ReviewerRepository},
};
use bookshelf_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::{DeletionSummary, FindResultExt, IntegrityGuard, not_found},
};

/// レビュアーの作成・更新の入力
pub struct ReviewerInput {
    pub first_name: String,
    pub last_name:  String,
}

/// レビュアーユースケース
pub struct ReviewerUseCaseImpl {
    reviewers:  Arc<dyn ReviewerRepository>,
    reviews:    Arc<dyn ReviewRepository>,
    guard:      IntegrityGuard,
    tx_manager: Arc<dyn TransactionManager>,
}

impl ReviewerUseCaseImpl {
    pub fn new(
        reviewers: Arc<dyn ReviewerRepository>,
        reviews: Arc<dyn ReviewRepository>,
        guard: IntegrityGuard,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            reviewers,
            reviews,
            guard,
            tx_manager,
        }
    }

    pub async fn list_reviewers(&self) -> Result<Vec<Reviewer>, CoreError> {
        Ok(self.reviewers.find_all().await?)
    }

    pub async fn get_reviewer(&self, id: ReviewerId) -> Result<Reviewer, CoreError> {
        self.reviewers
            .find_by_id(id)
            .await
            .or_not_found(EntityKind::Reviewer, id)
    }

    /// レビュアーが書いたレビュー一覧
    pub async fn list_reviews_of(&self, id: ReviewerId) -> Result<Vec<Review>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Reviewer, id.as_i32())
            .await?;
        Ok(self.reviews.find_by_reviewer(id).await?)
    }

    /// レビューを書いたレビュアー
    pub async fn get_reviewer_of_review(&self, review_id: ReviewId) -> Result<Reviewer, CoreError> {
        self.reviewers
            .find_by_review(review_id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Review, review_id))
    }

    pub async fn create_reviewer(&self, input: ReviewerInput) -> Result<Reviewer, CoreError> {
        let draft = NewReviewer::new(input.first_name, input.last_name)?;

        let mut tx = self.tx_manager.begin().await?;
        let reviewer = self.reviewers.insert(&mut tx, &draft).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::REVIEWER_CREATED,
            event.entity_type = event::entity_type::REVIEWER,
            event.entity_id = %reviewer.id(),
            event.result = event::result::SUCCESS,
            "レビュアーを作成しました"
        );

        Ok(reviewer)
    }

    pub async fn update_reviewer(
        &self,
        id: ReviewerId,
        input: ReviewerInput,
    ) -> Result<Reviewer, CoreError> {
        let draft = NewReviewer::new(input.first_name, input.last_name)?;
        let reviewer = self.get_reviewer(id).await?.replaced(draft);

        let mut tx = self.tx_manager.begin().await?;
        self.reviewers.update(&mut tx, &reviewer).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::REVIEWER_UPDATED,
            event.entity_type = event::entity_type::REVIEWER,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "レビュアーを更新しました"
        );

        Ok(reviewer)
    }

    /// レビュアーを削除する
    ///
    /// 書いたレビューも同じトランザクションで削除する。
    pub async fn delete_reviewer(&self, id: ReviewerId) -> Result<DeletionSummary, CoreError> {
        let summary = self.guard.delete(EntityKind::Reviewer, id.as_i32()).await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::REVIEWER_DELETED,
            event.entity_type = event::entity_type::REVIEWER,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "レビュアーを削除しました"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use bookshelf_domain::integrity::Dependent;
    use bookshelf_infra::mock::MockCatalog;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::mock_usecases;

    fn create_usecase() -> (ReviewerUseCaseImpl, MockCatalog) {
        let (usecases, catalog, _) = mock_usecases();
        (usecases.reviewer, catalog)
    }

    fn input(first_name: &str, last_name: &str) -> ReviewerInput {
        ReviewerInput {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_レビュアーを作成できる() {
        let (sut, catalog) = create_usecase();

        let reviewer = sut.create_reviewer(input("Taro", "Yamada")).await.unwrap();

        assert_eq!(reviewer.last_name().as_str(), "Yamada");
        assert_eq!(catalog.with_tables(|t| t.reviewers.len()), 1);
    }

    #[tokio::test]
    async fn test_空の姓は400になる() {
        let (sut, _) = create_usecase();

        let err = sut.create_reviewer(input("Taro", " ")).await.unwrap_err();

        assert!(matches!(err, CoreError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_存在しないレビュアーの更新は404になる() {
        let (sut, _) = create_usecase();

        let err = sut
            .update_reviewer(ReviewerId::new(999), input("Taro", "Yamada"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_レビュアーの削除は書いたレビューだけを削除する() {
        let (sut, catalog) = create_usecase();
        let japan = catalog.seed_country("Japan");
        let author = catalog.seed_author("Soseki", "Natsume", japan.id());
        let novel = catalog.seed_category("Novel");
        let book = catalog.seed_book("4101010013", "Kokoro", &[author.id()], &[novel.id()]);
        let taro = catalog.seed_reviewer("Taro", "Yamada");
        let hanako = catalog.seed_reviewer("Hanako", "Suzuki");
        for rating in [1, 3, 5] {
            catalog.seed_review(book.id(), taro.id(), rating);
        }
        let kept = catalog.seed_review(book.id(), hanako.id(), 4);

        let summary = sut.delete_reviewer(taro.id()).await.unwrap();

        assert_eq!(summary.removed(Dependent::Rows(EntityKind::Review)), 3);
        assert_eq!(catalog.with_tables(|t| t.reviews.clone()), vec![kept]);
        assert_eq!(catalog.with_tables(|t| t.reviewers.clone()), vec![hanako]);
    }

    #[tokio::test]
    async fn test_レビュアー本体の削除が失敗するとレビューも削除されない() {
        let (sut, catalog) = create_usecase();
        let japan = catalog.seed_country("Japan");
        let author = catalog.seed_author("Soseki", "Natsume", japan.id());
        let novel = catalog.seed_category("Novel");
        let book = catalog.seed_book("4101010013", "Kokoro", &[author.id()], &[novel.id()]);
        let taro = catalog.seed_reviewer("Taro", "Yamada");
        for rating in [1, 3, 5] {
            catalog.seed_review(book.id(), taro.id(), rating);
        }
        catalog.fail_writes_to(EntityKind::Reviewer);

        let err = sut.delete_reviewer(taro.id()).await.unwrap_err();

        assert!(matches!(err, CoreError::Database(_)));
        catalog.with_tables(|t| {
            assert_eq!(t.reviews.len(), 3);
            assert_eq!(t.reviewers.clone(), vec![taro.clone()]);
        });
    }

    #[tokio::test]
    async fn test_レビューから書いたレビュアーを引ける() {
        let (sut, catalog) = create_usecase();
        let japan = catalog.seed_country("Japan");
        let author = catalog.seed_author("Soseki", "Natsume", japan.id());
        let novel = catalog.seed_category("Novel");
        let book = catalog.seed_book("4101010013", "Kokoro", &[author.id()], &[novel.id()]);
        let taro = catalog.seed_reviewer("Taro", "Yamada");
        let review = catalog.seed_review(book.id(), taro.id(), 5);

        assert_eq!(sut.get_reviewer_of_review(review.id()).await.unwrap(), taro.clone());
        assert_eq!(sut.list_reviews_of(taro.id()).await.unwrap(), vec![review]);
    }
}
