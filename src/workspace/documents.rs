use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::DocumentStore;
use crate::error::DocumentError;

/// 開いているドキュメントのマップとディスクを合わせたドキュメントストア
#[derive(Debug, Clone)]
pub struct WorkspaceDocuments {
    open: Arc<DashMap<Url, String>>,
}

impl WorkspaceDocuments {
    pub fn new(open: Arc<DashMap<Url, String>>) -> Self {
        Self { open }
    }
}

#[tower_lsp::async_trait]
impl DocumentStore for WorkspaceDocuments {
    fn open_document(&self, uri: &Url) -> Option<String> {
        self.open.get(uri).map(|doc| doc.value().clone())
    }

    async fn read_from_disk(&self, uri: &Url) -> Result<String, DocumentError> {
        let path = uri
            .to_file_path()
            .map_err(|_| DocumentError::NotAFile(uri.clone()))?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| DocumentError::Io {
                uri: uri.clone(),
                source,
            })?;
        String::from_utf8(bytes).map_err(|_| DocumentError::NotText { uri: uri.clone() })
    }
}
