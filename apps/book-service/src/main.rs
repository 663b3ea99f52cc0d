//! # Book Service サーバー
//!
//! 国・著者・カテゴリ・書籍・レビュー・レビュアーを管理する REST API。
//!
//! ## 役割
//!
//! - **CRUD**: 6 エンティティの作成・取得・更新・削除
//! - **参照整合性**: 参照先の存在確認、一意項目の重複チェック、削除ガードとカスケード削除
//! - **データ永続化**: PostgreSQL へのエンティティ保存
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `BOOK_SERVICE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `BOOK_SERVICE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `DATABASE_MAX_CONNECTIONS` | No | 接続プールの最大接続数（デフォルト: 10） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベルのフィルタ |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p bookshelf-book-service
//!
//! # 本番環境
//! BOOK_SERVICE_PORT=8080 DATABASE_URL=postgres://... LOG_FORMAT=json \
//!   cargo run -p bookshelf-book-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use bookshelf_book_service::{
    app::{CatalogRepositories, UseCases, build_app},
    config::BookServiceConfig,
    handler::ReadinessState,
};
use bookshelf_infra::db;
use bookshelf_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Book Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("book-service"));

    // 設定読み込み
    let config = BookServiceConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Book Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 依存コンポーネントを初期化
    let readiness_state = Arc::new(ReadinessState { pool: pool.clone() });
    let usecases = UseCases::new(CatalogRepositories::postgres(pool));
    let app = build_app(usecases, readiness_state);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} へのバインドに失敗しました"))?;
    tracing::info!("Book Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .await
        .context("サーバーが異常終了しました")?;

    Ok(())
}
