//! # Book Service ライブラリ
//!
//! Book Service のユースケース・ハンドラ・ルーター構築を公開する。
//! 結合テストからはインメモリ構成（`test_utils`）でルーターを組み立てて使う。

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod usecase;

// テストユーティリティ（内部実装、ドキュメントからは隠す）
#[doc(hidden)]
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
