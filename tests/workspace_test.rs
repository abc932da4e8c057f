//! 実ファイルシステム上のワークスペースに対する参照検索

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use angular_selector_lsp::config::{ExcludeGlob, ExcludeSettings};
use angular_selector_lsp::handler::ReferencesHandler;
use angular_selector_lsp::workspace::{
    FileSearch, Notifier, WorkspaceDocuments, WorkspaceFileSearch,
};

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

#[tower_lsp::async_trait]
impl Notifier for RecordingNotifier {
    async fn report_error(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}

/// 決まった候補を返すファイル検索（ディスク上に存在しないファイルも返せる）
struct FixedSearch {
    files: Vec<Url>,
}

#[tower_lsp::async_trait]
impl FileSearch for FixedSearch {
    async fn find_files(&self, _include: &str, _exclude: &ExcludeGlob) -> Vec<Url> {
        self.files.clone()
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn file_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_workspace_references() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(
        &root,
        "src/app/hero.component.ts",
        "@Component({\n  selector: 'app-hero',\n})\nexport class HeroComponent {}",
    );
    write(&root, "src/app/app.component.html", "<main>\n  <app-hero></app-hero>\n</main>");
    write(&root, "src/app/list.component.html", "<app-hero *ngFor=\"let h of heroes\"></app-hero>");
    write(&root, "node_modules/lib/demo.html", "<app-hero></app-hero>");
    write(&root, "dist/index.html", "<app-hero></app-hero>");
    write(
        &root,
        ".vscode/settings.json",
        r#"{ "search.exclude": { "**/node_modules": true, "**/dist": true } }"#,
    );

    let open = Arc::new(DashMap::new());
    let search = WorkspaceFileSearch::new(root.clone(), Arc::clone(&open));
    let documents = WorkspaceDocuments::new(Arc::clone(&open));
    let notifier = RecordingNotifier::default();
    let settings = ExcludeSettings::resolve(None, Some(&root));

    let locations = ReferencesHandler::new(&search, &documents, &notifier)
        .find_references("  selector: 'app-hero',", &settings)
        .await;

    let found: Vec<(String, u32, u32)> = locations
        .iter()
        .map(|l| (file_name(&l.uri), l.range.start.line, l.range.start.character))
        .collect();
    assert_eq!(
        found,
        vec![
            ("app.component.html".to_string(), 1, 3),
            ("list.component.html".to_string(), 0, 1),
        ]
    );
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsaved_edits_are_searched() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root, "hero.html", "<div></div>");

    let open = Arc::new(DashMap::new());
    let saved = Url::from_file_path(root.join("hero.html")).unwrap();
    let unsaved = Url::from_file_path(root.join("new.html")).unwrap();
    open.insert(saved.clone(), "<div [heroProp]=\"x\"></div>".to_string());
    open.insert(unsaved.clone(), "<p heroProp></p>".to_string());

    let search = WorkspaceFileSearch::new(root.clone(), Arc::clone(&open));
    let documents = WorkspaceDocuments::new(Arc::clone(&open));
    let notifier = RecordingNotifier::default();

    let locations = ReferencesHandler::new(&search, &documents, &notifier)
        .find_references("selector: '[heroProp]'", &ExcludeSettings::default())
        .await;

    let uris: Vec<Url> = locations.iter().map(|l| l.uri.clone()).collect();
    assert_eq!(uris, vec![saved, unsaved]);
}

#[tokio::test]
async fn test_unreadable_template_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root, "a.html", "<app-hero></app-hero>");
    fs::write(root.join("b.html"), [0xc3, 0x28, 0xff]).unwrap();

    let open = Arc::new(DashMap::new());
    let search = WorkspaceFileSearch::new(root.clone(), Arc::clone(&open));
    let documents = WorkspaceDocuments::new(Arc::clone(&open));
    let notifier = RecordingNotifier::default();

    let locations = ReferencesHandler::new(&search, &documents, &notifier)
        .find_references("selector: 'app-hero'", &ExcludeSettings::default())
        .await;

    assert_eq!(locations.len(), 1);
    let messages = notifier.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("b.html"), "{}", messages[0]);
}

#[tokio::test]
async fn test_missing_template_is_reported_with_its_uri() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let gone = Url::from_file_path(root.join("gone.html")).unwrap();

    let search = FixedSearch {
        files: vec![gone.clone()],
    };
    let documents = WorkspaceDocuments::new(Arc::new(DashMap::new()));
    let notifier = RecordingNotifier::default();

    let locations = ReferencesHandler::new(&search, &documents, &notifier)
        .find_references("selector: 'app-hero'", &ExcludeSettings::default())
        .await;

    assert!(locations.is_empty());
    let messages = notifier.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with(gone.as_str()), "{}", messages[0]);
}
