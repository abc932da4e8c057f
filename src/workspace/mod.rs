//! 参照検索が依存する外部コラボレーター
//!
//! ファイル検索・ドキュメント取得・エラー通知をトレイトとして切り出し、
//! 参照検索のロジックを固定入力でテストできるようにしている。

mod documents;
mod search;

use tower_lsp::lsp_types::Url;

use crate::config::ExcludeGlob;
use crate::error::DocumentError;

pub use documents::WorkspaceDocuments;
pub use search::WorkspaceFileSearch;

/// ワークスペース内の候補ファイル検索
#[tower_lsp::async_trait]
pub trait FileSearch: Send + Sync {
    /// `include` に一致し `exclude` に一致しないファイルを決まった順序で返す
    async fn find_files(&self, include: &str, exclude: &ExcludeGlob) -> Vec<Url>;
}

/// ドキュメント本文の取得
#[tower_lsp::async_trait]
pub trait DocumentStore: Send + Sync {
    /// エディタで開かれているドキュメントの本文
    fn open_document(&self, uri: &Url) -> Option<String>;

    /// ディスク上の本文
    async fn read_from_disk(&self, uri: &Url) -> Result<String, DocumentError>;

    /// 開かれているドキュメントを優先して本文を取得
    async fn load(&self, uri: &Url) -> Result<String, DocumentError> {
        if let Some(text) = self.open_document(uri) {
            return Ok(text);
        }
        self.read_from_disk(uri).await
    }
}

/// ユーザーへのエラー通知（結果は待たない）
#[tower_lsp::async_trait]
pub trait Notifier: Send + Sync {
    async fn report_error(&self, message: String);
}
