//! # Book Service 設定
//!
//! 環境変数から Book Service サーバーの設定を読み込む。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `BOOK_SERVICE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `BOOK_SERVICE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `DATABASE_MAX_CONNECTIONS` | No | 接続プールの最大接続数（デフォルト: 10） |

use std::env;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません（.env を確認してください）")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Book Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookServiceConfig {
    /// バインドアドレス
    pub host:            String,
    /// ポート番号
    pub port:            u16,
    /// データベース接続 URL
    pub database_url:    String,
    /// 接続プールの最大接続数
    pub max_connections: u32,
}

impl BookServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでプロセスの環境変数を書き換えずに済むよう分離している。
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port_raw = required("BOOK_SERVICE_PORT")?;
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name:  "BOOK_SERVICE_PORT",
            value: port_raw,
        })?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name:  "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            host: lookup("BOOK_SERVICE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: required("DATABASE_URL")?,
            max_connections,
        })
    }
}
