use std::collections::HashSet;

use tower_lsp::lsp_types::{Location, Url};
use tracing::{debug, warn};

use crate::config::ExcludeSettings;
use crate::scanner::scan_document;
use crate::selector::{SelectorMatcher, compile_selector_matcher};
use crate::workspace::{DocumentStore, FileSearch, Notifier};

/// 参照検索の対象となるテンプレートファイル
pub const TEMPLATE_GLOB: &str = "**/*.html";

/// セレクタ宣言からテンプレート内の使用箇所を集めるハンドラ
pub struct ReferencesHandler<'a> {
    search: &'a dyn FileSearch,
    documents: &'a dyn DocumentStore,
    notifier: &'a dyn Notifier,
}

impl<'a> ReferencesHandler<'a> {
    pub fn new(
        search: &'a dyn FileSearch,
        documents: &'a dyn DocumentStore,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            search,
            documents,
            notifier,
        }
    }

    /// セレクタ宣言の行から参照を検索
    ///
    /// セレクタ宣言でなければファイル検索を行わずに空を返す。
    pub async fn find_references(
        &self,
        declaration: &str,
        settings: &ExcludeSettings,
    ) -> Vec<Location> {
        let Some(matcher) = compile_selector_matcher(declaration) else {
            debug!("find_references: no selector declaration found");
            return Vec::new();
        };
        self.find_selector_references(&matcher, settings).await
    }

    pub async fn find_selector_references(
        &self,
        matcher: &SelectorMatcher,
        settings: &ExcludeSettings,
    ) -> Vec<Location> {
        let candidates = self.find_candidates(settings).await;
        self.scan_candidates(matcher, &candidates).await
    }

    /// 除外設定を反映して候補ファイルを検索（重複URIは最初の位置だけ残す）
    pub async fn find_candidates(&self, settings: &ExcludeSettings) -> Vec<Url> {
        let exclude = settings.exclusion_glob();
        let found = self.search.find_files(TEMPLATE_GLOB, &exclude).await;

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|uri| seen.insert(uri.clone()))
            .collect()
    }

    /// 候補を1つずつ読み込んで走査する
    ///
    /// 読み込みに失敗したドキュメントは通知して飛ばし、残りの走査を続ける。
    pub async fn scan_candidates(
        &self,
        matcher: &SelectorMatcher,
        candidates: &[Url],
    ) -> Vec<Location> {
        let mut locations = Vec::new();

        for uri in candidates {
            let text = match self.documents.load(uri).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("scan_candidates: failed to load {}", e);
                    self.notifier.report_error(e.to_string()).await;
                    continue;
                }
            };

            let spans = scan_document(matcher, &text);
            if !spans.is_empty() {
                debug!("scan_candidates: {} usages in {}", spans.len(), uri);
            }
            locations.extend(spans.into_iter().map(|span| Location {
                uri: uri.clone(),
                range: span.to_lsp_range(),
            }));
        }

        locations
    }
}
