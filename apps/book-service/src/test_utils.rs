//! # テストユーティリティ
//!
//! ユースケース・ハンドラ・結合テストで使うインメモリ構成。
//! 全リポジトリが 1 つの [`MockCatalog`] を共有するため、
//! シードしたデータはどのユースケースからも見える。

use std::sync::Arc;

use axum::Router;
use bookshelf_infra::mock::{MockCatalog, MockTransactionManager};

use crate::app::{CatalogRepositories, UseCases, build_api_router};

/// インメモリのリポジトリ一式
pub fn mock_repositories() -> (CatalogRepositories, MockCatalog, MockTransactionManager) {
    let catalog = MockCatalog::new();
    let tx_manager = MockTransactionManager::with_rollback(&catalog);
    let repos = CatalogRepositories {
        countries:  Arc::new(catalog.clone()),
        authors:    Arc::new(catalog.clone()),
        categories: Arc::new(catalog.clone()),
        books:      Arc::new(catalog.clone()),
        reviews:    Arc::new(catalog.clone()),
        reviewers:  Arc::new(catalog.clone()),
        integrity:  Arc::new(catalog.clone()),
        tx_manager: Arc::new(tx_manager.clone()),
    };
    (repos, catalog, tx_manager)
}

/// インメモリのリポジトリで組み立てたユースケース一式
pub fn mock_usecases() -> (UseCases, MockCatalog, MockTransactionManager) {
    let (repos, catalog, tx_manager) = mock_repositories();
    (UseCases::new(repos), catalog, tx_manager)
}

/// インメモリのリポジトリで組み立てた `/api/v1` ルーター
pub fn mock_api_router() -> (Router, MockCatalog) {
    let (usecases, catalog, _) = mock_usecases();
    (build_api_router(usecases), catalog)
}
