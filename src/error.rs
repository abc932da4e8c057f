use std::io;

use thiserror::Error;
use tower_lsp::lsp_types::Url;

/// 候補ドキュメントの取得エラー
///
/// `Display` の文字列はそのままクライアントへのエラー通知に使われる。
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{uri}: {source}")]
    Io {
        uri: Url,
        #[source]
        source: io::Error,
    },

    #[error("Not a file URI: {0}")]
    NotAFile(Url),

    #[error("{uri} is not a UTF-8 text document")]
    NotText { uri: Url },
}

/// 除外設定の構築エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSet(#[from] globset::Error),
}
