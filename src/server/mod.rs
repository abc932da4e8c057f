mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::debug;

use crate::config::{EXCLUDE_SECTIONS, ExcludeSettings};
use crate::handler::{ReferencesHandler, goto_resource_definition};
use crate::selector::compile_selector_matcher;
use crate::util::line_at;
use crate::workspace::{DocumentStore, Notifier, WorkspaceDocuments, WorkspaceFileSearch};

use progress::Progress;

/// クライアントの `window/showMessage` に流すエラー通知
struct ClientNotifier {
    client: Client,
}

#[tower_lsp::async_trait]
impl Notifier for ClientNotifier {
    async fn report_error(&self, message: String) {
        self.client.show_message(MessageType::ERROR, message).await;
    }
}

pub struct Backend {
    client: Client,
    root_uri: RwLock<Option<Url>>,
    documents: Arc<DashMap<Url, String>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            root_uri: RwLock::new(None),
            documents: Arc::new(DashMap::new()),
        }
    }

    async fn root_path(&self) -> Option<PathBuf> {
        self.root_uri.read().await.as_ref()?.to_file_path().ok()
    }

    /// 除外設定をリクエストごとに取得し直す
    async fn exclude_settings(&self, root: Option<&Path>) -> ExcludeSettings {
        let items = EXCLUDE_SECTIONS
            .iter()
            .map(|section| ConfigurationItem {
                scope_uri: None,
                section: Some(section.to_string()),
            })
            .collect();

        let values = match self.client.configuration(items).await {
            Ok(values) => Some(values),
            Err(e) => {
                debug!("workspace/configuration unavailable: {}", e);
                None
            }
        };
        ExcludeSettings::resolve(values, root)
    }

    /// 指定行のテキスト（開いているドキュメントを優先）
    async fn line_text(&self, uri: &Url, line: u32) -> Option<String> {
        let documents = WorkspaceDocuments::new(Arc::clone(&self.documents));
        let text = match documents.load(uri).await {
            Ok(text) => text,
            Err(e) => {
                debug!("line_text: failed to load {}: {}", uri, e);
                return None;
            }
        };
        line_at(&text, line).map(str::to_string)
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = params.root_uri.or_else(|| {
            params
                .workspace_folders
                .as_ref()?
                .first()
                .map(|f| f.uri.clone())
        });

        *self.root_uri.write().await = root;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "angular-selector-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                references_provider: Some(OneOf::Left(true)),
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        let root = self.root_path().await;
        self.client
            .log_message(
                MessageType::INFO,
                format!("Angular selector language server initialized (root: {:?})", root),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.documents.clear();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.documents
            .insert(params.text_document.uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().next() {
            self.documents.insert(params.text_document.uri, change.text);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(text) = params.text {
            self.documents.insert(params.text_document.uri, text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(line) = self.line_text(uri, position.line).await else {
            return Ok(None);
        };
        let Some(matcher) = compile_selector_matcher(&line) else {
            debug!("references: no selector at {}:{}", uri, position.line);
            return Ok(Some(Vec::new()));
        };
        let Some(root) = self.root_path().await else {
            debug!("references: no workspace root, skipping template search");
            return Ok(Some(Vec::new()));
        };

        let settings = self.exclude_settings(Some(&root)).await;
        let search = WorkspaceFileSearch::new(root, Arc::clone(&self.documents));
        let documents = WorkspaceDocuments::new(Arc::clone(&self.documents));
        let notifier = ClientNotifier {
            client: self.client.clone(),
        };
        let handler = ReferencesHandler::new(&search, &documents, &notifier);

        let progress = Progress::begin(
            &self.client,
            "angular-selector-references",
            "Finding selector references",
            format!("Searching templates for {}", matcher.names()),
        )
        .await;

        let candidates = handler.find_candidates(&settings).await;
        progress
            .report(format!("Scanning {} templates", candidates.len()))
            .await;
        let locations = handler.scan_candidates(&matcher, &candidates).await;

        progress
            .end(format!("Found {} references", locations.len()))
            .await;

        Ok(Some(locations))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(line) = self.line_text(uri, position.line).await else {
            return Ok(None);
        };

        let location = goto_resource_definition(uri, &line, position).await;
        debug!(
            "goto_definition at {}:{}:{} -> {:?}",
            uri,
            position.line,
            position.character,
            location.as_ref().map(|l| l.uri.as_str())
        );
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }
}
