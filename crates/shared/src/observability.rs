//! # トレーシング初期化
//!
//! `LOG_FORMAT`（`json` / `pretty`）と `RUST_LOG` から subscriber を組み立てる。
//! `tracing_error::ErrorLayer` も登録するので、`InfraError` が捕捉する
//! `SpanTrace` にはリポジトリの instrument スパンが残る。

use std::str::FromStr;

/// ログの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// 1 行 1 JSON（ログ集約基盤向け）
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT` の値を解釈する
    ///
    /// 未知の値は `Pretty` として扱う。subscriber の初期化前に呼ばれるため、
    /// 警告は stderr に直接出す。
    pub fn parse_or_default(value: &str) -> Self {
        Self::from_str(value).unwrap_or_else(|_| {
            eprintln!("LOG_FORMAT={value:?} には対応していないため pretty で出力します");
            Self::Pretty
        })
    }
}

/// `RUST_LOG` 未指定時のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,bookshelf=debug";

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub service_name: String,
    pub log_format:   LogFormat,
    /// `EnvFilter` の指定文字列
    pub filter:       String,
}

impl TracingConfig {
    /// 既定値（pretty 出力、[`DEFAULT_LOG_FILTER`]）で作成する
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_format:   LogFormat::default(),
            filter:       DEFAULT_LOG_FILTER.to_string(),
        }
    }

    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// `LOG_FORMAT` と `RUST_LOG` を反映する
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let mut config = Self::new(service_name);
        if let Ok(value) = std::env::var("LOG_FORMAT") {
            config = config.with_log_format(LogFormat::parse_or_default(&value));
        }
        match std::env::var("RUST_LOG") {
            Ok(filter) if !filter.trim().is_empty() => config.with_filter(filter),
            _ => config,
        }
    }
}

/// グローバル subscriber を登録する
///
/// `filter` が解釈できない場合は [`DEFAULT_LOG_FILTER`] で起動する。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|err| {
        eprintln!(
            "RUST_LOG={:?} を解釈できないため {DEFAULT_LOG_FILTER} を使います: {err}",
            config.filter
        );
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    let output = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::info!(
        service = %config.service_name,
        log_format = %config.log_format,
        filter = %config.filter,
        "トレーシングを初期化しました"
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    #[case("JSON", LogFormat::Pretty)]
    #[case("yaml", LogFormat::Pretty)]
    #[case("", LogFormat::Pretty)]
    fn test_parse_or_defaultは未知の値をprettyにする(
        #[case] input: &str,
        #[case] expected: LogFormat,
    ) {
        assert_eq!(LogFormat::parse_or_default(input), expected);
    }

    #[test]
    fn test_log_formatは小文字で表示される() {
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_newは既定のフィルタとpretty出力を使う() {
        let config = TracingConfig::new("book-service");

        assert_eq!(
            config,
            TracingConfig {
                service_name: "book-service".to_string(),
                log_format:   LogFormat::Pretty,
                filter:       DEFAULT_LOG_FILTER.to_string(),
            }
        );
    }

    #[test]
    fn test_with系メソッドで出力形式とフィルタを上書きできる() {
        let config = TracingConfig::new("book-service")
            .with_log_format(LogFormat::Json)
            .with_filter("warn");

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.filter, "warn");
    }
}
