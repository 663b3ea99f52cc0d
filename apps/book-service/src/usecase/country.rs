//! 国ユースケース

use std::sync::Arc;

use bookshelf_domain::{
    author::{Author, AuthorId},
    country::{Country, CountryId, NewCountry},
    integrity::EntityKind,
};
use bookshelf_infra::{
    db::TransactionManager,
    repository::{AuthorRepository, CountryRepository},
};
use bookshelf_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::{DeletionSummary, FindResultExt, IntegrityGuard, not_found},
};

/// 国の作成・更新の入力
pub struct CountryInput {
    pub name: String,
}

/// 国ユースケース
pub struct CountryUseCaseImpl {
    countries:  Arc<dyn CountryRepository>,
    authors:    Arc<dyn AuthorRepository>,
    guard:      IntegrityGuard,
    tx_manager: Arc<dyn TransactionManager>,
}

impl CountryUseCaseImpl {
    pub fn new(
        countries: Arc<dyn CountryRepository>,
        authors: Arc<dyn AuthorRepository>,
        guard: IntegrityGuard,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            countries,
            authors,
            guard,
            tx_manager,
        }
    }

    pub async fn list_countries(&self) -> Result<Vec<Country>, CoreError> {
        Ok(self.countries.find_all().await?)
    }

    pub async fn get_country(&self, id: CountryId) -> Result<Country, CoreError> {
        self.countries
            .find_by_id(id)
            .await
            .or_not_found(EntityKind::Country, id)
    }

    /// 国に所属する著者一覧
    pub async fn list_authors_of(&self, id: CountryId) -> Result<Vec<Author>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Country, id.as_i32())
            .await?;
        Ok(self.authors.find_by_country(id).await?)
    }

    /// 著者が所属する国
    pub async fn get_country_of_author(&self, author_id: AuthorId) -> Result<Country, CoreError> {
        self.countries
            .find_by_author(author_id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Author, author_id))
    }

    /// 国を作成する
    ///
    /// 1. 国名の検証（400）
    /// 2. 正規化した国名の重複チェック（422）
    /// 3. 挿入（事前チェック後の重複は一意インデックスが 422 にする）
    pub async fn create_country(&self, input: CountryInput) -> Result<Country, CoreError> {
        let draft = NewCountry::new(input.name)?;
        self.guard
            .ensure_unique(EntityKind::Country, None, draft.name.as_str())
            .await?;

        let mut tx = self.tx_manager.begin().await?;
        let country = self.countries.insert(&mut tx, &draft).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::COUNTRY_CREATED,
            event.entity_type = event::entity_type::COUNTRY,
            event.entity_id = %country.id(),
            event.result = event::result::SUCCESS,
            "国を作成しました"
        );

        Ok(country)
    }

    /// 国を更新する（全項目の置き換え）
    pub async fn update_country(
        &self,
        id: CountryId,
        input: CountryInput,
    ) -> Result<Country, CoreError> {
        let draft = NewCountry::new(input.name)?;
        let existing = self.get_country(id).await?;
        self.guard
            .ensure_unique(EntityKind::Country, Some(id.as_i32()), draft.name.as_str())
            .await?;

        let country = existing.replaced(draft);
        let mut tx = self.tx_manager.begin().await?;
        self.countries.update(&mut tx, &country).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::COUNTRY_UPDATED,
            event.entity_type = event::entity_type::COUNTRY,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "国を更新しました"
        );

        Ok(country)
    }

    /// 国を削除する（著者が所属していれば 409）
    pub async fn delete_country(&self, id: CountryId) -> Result<DeletionSummary, CoreError> {
        let summary = self.guard.delete(EntityKind::Country, id.as_i32()).await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::COUNTRY_DELETED,
            event.entity_type = event::entity_type::COUNTRY,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "国を削除しました"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use bookshelf_infra::mock::{MockCatalog, MockTransactionManager};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::mock_usecases;

    fn create_usecase() -> (CountryUseCaseImpl, MockCatalog, MockTransactionManager) {
        let (usecases, catalog, tx_manager) = mock_usecases();
        (usecases.country, catalog, tx_manager)
    }

    fn input(name: &str) -> CountryInput {
        CountryInput {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_国を作成すると前後の空白が除去されて保存される() {
        let (sut, catalog, _) = create_usecase();

        let country = sut.create_country(input("  France ")).await.unwrap();

        assert_eq!(country.name().as_str(), "France");
        assert_eq!(catalog.with_tables(|t| t.countries.clone()), vec![country]);
    }

    #[tokio::test]
    async fn test_正規化後に同じ国名の作成は422になる() {
        let (sut, catalog, tx_manager) = create_usecase();
        sut.create_country(input("France")).await.unwrap();

        let err = sut.create_country(input("france ")).await.unwrap_err();

        assert!(matches!(err, CoreError::Duplicate(_)));
        assert_eq!(catalog.with_tables(|t| t.countries.len()), 1);
        assert_eq!(tx_manager.begun(), 1);
    }

    #[tokio::test]
    async fn test_空の国名は400になる() {
        let (sut, _, tx_manager) = create_usecase();

        let err = sut.create_country(input("   ")).await.unwrap_err();

        assert!(matches!(err, CoreError::BadRequest(_)));
        assert_eq!(tx_manager.begun(), 0);
    }

    #[tokio::test]
    async fn test_事前チェックを同時に通過した重複は一意インデックスで422になる() {
        let (sut, catalog, _) = create_usecase();

        // 2 つのリクエストがどちらも書き込み前に事前チェックを通過する
        let first = sut.guard.ensure_unique(EntityKind::Country, None, "France").await;
        let second = sut.guard.ensure_unique(EntityKind::Country, None, "FRANCE").await;
        assert!(first.is_ok());
        assert!(second.is_ok());

        // 先に書き込んだ方が成功し、後の書き込みはストレージ側で拒否される
        sut.create_country(input("France")).await.unwrap();
        let mut tx = sut.tx_manager.begin().await.unwrap();
        let late = sut
            .countries
            .insert(&mut tx, &NewCountry::new("FRANCE").unwrap())
            .await
            .map_err(CoreError::from);

        assert!(matches!(late, Err(CoreError::Duplicate(_))));
        assert_eq!(catalog.with_tables(|t| t.countries.len()), 1);
    }

    #[tokio::test]
    async fn test_自身と同じ名前への更新は重複扱いにならない() {
        let (sut, catalog, _) = create_usecase();
        let france = catalog.seed_country("France");

        let updated = sut
            .update_country(france.id(), input("FRANCE"))
            .await
            .unwrap();

        assert_eq!(updated.name().as_str(), "FRANCE");
    }

    #[tokio::test]
    async fn test_他の国と同じ名前への更新は422になる() {
        let (sut, catalog, _) = create_usecase();
        catalog.seed_country("France");
        let japan = catalog.seed_country("Japan");

        let err = sut
            .update_country(japan.id(), input(" france"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_存在しない国の更新は404になる() {
        let (sut, _, _) = create_usecase();

        let err = sut
            .update_country(CountryId::new(999), input("France"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_著者のいる国の削除は409で件数が報告される() {
        let (sut, catalog, _) = create_usecase();
        let japan = catalog.seed_country("Japan");
        catalog.seed_author("Soseki", "Natsume", japan.id());
        catalog.seed_author("Ogai", "Mori", japan.id());

        let err = sut.delete_country(japan.id()).await.unwrap_err();

        assert!(matches!(err, CoreError::Conflict(msg) if msg.contains("2 件の著者")));
    }

    #[tokio::test]
    async fn test_著者のいない国は削除できる() {
        let (sut, catalog, _) = create_usecase();
        let japan = catalog.seed_country("Japan");

        let summary = sut.delete_country(japan.id()).await.unwrap();

        assert_eq!(summary.entity, EntityKind::Country);
        assert!(summary.cascaded.is_empty());
        assert!(catalog.with_tables(|t| t.countries.is_empty()));
    }

    #[tokio::test]
    async fn test_著者から所属する国を引ける() {
        let (sut, catalog, _) = create_usecase();
        let japan = catalog.seed_country("Japan");
        let author = catalog.seed_author("Soseki", "Natsume", japan.id());

        assert_eq!(sut.get_country_of_author(author.id()).await.unwrap(), japan);
        assert!(matches!(
            sut.get_country_of_author(AuthorId::new(999)).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_存在しない国の著者一覧は404になる() {
        let (sut, _, _) = create_usecase();

        let err = sut.list_authors_of(CountryId::new(1)).await.unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
