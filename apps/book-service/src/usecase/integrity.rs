//! # 参照整合性ガード
//!
//! 関係テーブル（`bookshelf_domain::integrity::RELATIONS`）を引いて、
//! 6 エンティティ共通の整合性ルールを 1 か所で実行する。
//!
//! - 存在確認: リクエストの参照 ID が実在するか（404）
//! - 一意性チェック: 正規化後の名前・ISBN が他の行と衝突しないか（422）
//! - 削除ガード: 拒否ポリシーの依存データが残っていないか（409）
//! - カスケード削除: 依存データと本体を 1 トランザクションで削除する
//!
//! 一意性チェックと削除ガードは書き込み前の事前チェックであり、
//! 同時実行時の最終的な保証はデータベースの一意インデックスと外部キーが持つ。

use std::sync::Arc;

use bookshelf_domain::{
    DomainError,
    integrity::{DeleteConflict, DeletePolicy, Dependent, EntityKind, relations_of},
};
use bookshelf_infra::{
    InfraError,
    db::TransactionManager,
    repository::IntegrityRepository,
};
use bookshelf_shared::{event_log::event, log_business_event};

use crate::{error::CoreError, usecase::not_found};

/// カスケードで削除された依存データの件数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeCount {
    pub dependent: Dependent,
    pub removed:   u64,
}

/// 削除結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionSummary {
    pub entity:   EntityKind,
    pub id:       i32,
    /// 関係テーブルの宣言順
    pub cascaded: Vec<CascadeCount>,
}

impl DeletionSummary {
    /// 指定した依存データの削除件数（カスケード対象でなければ 0）
    pub fn removed(&self, dependent: Dependent) -> u64 {
        self.cascaded
            .iter()
            .find(|c| c.dependent == dependent)
            .map_or(0, |c| c.removed)
    }
}

/// 参照整合性ガード
#[derive(Clone)]
pub struct IntegrityGuard {
    integrity:  Arc<dyn IntegrityRepository>,
    tx_manager: Arc<dyn TransactionManager>,
}

impl IntegrityGuard {
    pub fn new(
        integrity: Arc<dyn IntegrityRepository>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            integrity,
            tx_manager,
        }
    }

    /// 行が存在することを確認する（存在しなければ 404）
    pub async fn ensure_exists(&self, kind: EntityKind, id: i32) -> Result<(), CoreError> {
        if self.integrity.exists(kind, id).await? {
            Ok(())
        } else {
            Err(not_found(kind, id))
        }
    }

    /// 一意項目が他の行と重複しないことを確認する（重複していれば 422）
    ///
    /// 更新時は `exclude` に自身の ID を渡す。
    pub async fn ensure_unique(
        &self,
        kind: EntityKind,
        exclude: Option<i32>,
        candidate: &str,
    ) -> Result<(), CoreError> {
        let Some(field) = kind.unique_field() else {
            return Ok(());
        };

        if self.integrity.has_duplicate(kind, exclude, candidate).await? {
            return Err(DomainError::Duplicate(format!(
                "{}の{} {} は既に登録されています",
                kind.label(),
                field.label(),
                candidate.trim()
            ))
            .into());
        }
        Ok(())
    }

    /// 削除を妨げる依存データを探す
    ///
    /// 拒否ポリシーの関係を宣言順に数え、最初に見つかった 1 件を返す。
    pub async fn find_blocking(
        &self,
        kind: EntityKind,
        id: i32,
    ) -> Result<Option<DeleteConflict>, InfraError> {
        for relation in relations_of(kind).filter(|r| r.on_delete == DeletePolicy::Restrict) {
            let count = self.integrity.count_dependents(relation, id).await?;
            if count > 0 {
                return Ok(Some(DeleteConflict {
                    entity: kind,
                    dependent: relation.dependent,
                    count,
                }));
            }
        }
        Ok(None)
    }

    /// 削除ガードを通したうえで、依存データごと削除する
    ///
    /// 1. 存在確認（404）
    /// 2. 拒否ポリシーの依存データ確認（409、件数をメッセージに含める）
    /// 3. カスケード対象を宣言順に削除
    /// 4. 本体を削除してコミット
    ///
    /// 途中の書き込みが失敗した場合は `TxContext` のドロップでロールバックされる。
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn delete(&self, kind: EntityKind, id: i32) -> Result<DeletionSummary, CoreError> {
        self.ensure_exists(kind, id).await?;

        if let Some(conflict) = self.find_blocking(kind, id).await? {
            log_business_event!(
                event.category = event::category::CATALOG,
                event.action = event::action::DELETE_BLOCKED,
                event.entity_type = %kind,
                event.entity_id = id,
                event.dependent = %conflict.dependent,
                event.dependent_count = conflict.count,
                event.result = event::result::FAILURE,
                "依存データが残っているため削除を拒否しました"
            );
            return Err(DomainError::Conflict(conflict.to_string()).into());
        }

        let mut tx = self.tx_manager.begin().await?;

        let mut cascaded = Vec::new();
        for relation in relations_of(kind).filter(|r| r.on_delete == DeletePolicy::Cascade) {
            let removed = self
                .integrity
                .delete_dependents(&mut tx, relation, id)
                .await?;
            cascaded.push(CascadeCount {
                dependent: relation.dependent,
                removed,
            });
        }

        let rows = self.integrity.delete_row(&mut tx, kind, id).await?;
        if rows == 0 {
            // 存在確認の後に別リクエストが削除した
            return Err(not_found(kind, id));
        }

        tx.commit().await?;

        Ok(DeletionSummary {
            entity: kind,
            id,
            cascaded,
        })
    }
}
