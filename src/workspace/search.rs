use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::FileSearch;
use crate::config::{ExcludeGlob, PathMatcher};
use crate::util::is_html_file;

/// Walks the workspace root on disk, then appends open documents the walk did not see
#[derive(Debug, Clone)]
pub struct WorkspaceFileSearch {
    root: PathBuf,
    open: Arc<DashMap<Url, String>>,
}

impl WorkspaceFileSearch {
    pub fn new(root: PathBuf, open: Arc<DashMap<Url, String>>) -> Self {
        Self { root, open }
    }

    /// Open HTML documents under the root that pass the matcher, sorted by URI
    fn open_documents(&self, matcher: &PathMatcher) -> Vec<Url> {
        let mut uris: Vec<Url> = self
            .open
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|uri| is_html_file(uri))
            .filter(|uri| {
                let Ok(path) = uri.to_file_path() else {
                    return false;
                };
                path.strip_prefix(&self.root)
                    .is_ok_and(|relative| matcher.should_include(relative))
            })
            .collect();
        uris.sort();
        uris
    }
}

#[tower_lsp::async_trait]
impl FileSearch for WorkspaceFileSearch {
    async fn find_files(&self, include: &str, exclude: &ExcludeGlob) -> Vec<Url> {
        let matcher = match PathMatcher::new(&[include.to_string()], exclude.patterns()) {
            Ok(matcher) => matcher,
            Err(e) => {
                tracing::warn!("find_files: {}", e);
                return Vec::new();
            }
        };

        let root = self.root.clone();
        let walk_matcher = matcher.clone();
        let mut files = tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            collect_files(&root, &root, &walk_matcher, &mut files);
            files
        })
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("find_files: workspace walk failed: {}", e);
            Vec::new()
        });

        let seen: HashSet<Url> = files.iter().cloned().collect();
        files.extend(
            self.open_documents(&matcher)
                .into_iter()
                .filter(|uri| !seen.contains(uri)),
        );

        tracing::debug!(
            "find_files: {} candidates for {} excluding {}",
            files.len(),
            include,
            exclude
        );
        files
    }
}

/// Collect files accepted by the matcher, depth-first in file-name order
pub fn collect_files(dir: &Path, root: &Path, matcher: &PathMatcher, files: &mut Vec<Url>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<(PathBuf, bool)> = entries
        .flatten()
        .map(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (entry.path(), is_dir)
        })
        .collect();
    entries.sort();

    for (path, is_dir) in entries {
        let relative_path = path.strip_prefix(root).unwrap_or(&path);

        if is_dir {
            if matcher.should_traverse_dir(relative_path) {
                collect_files(&path, root, matcher, files);
            }
        } else if matcher.should_include(relative_path) {
            if let Ok(uri) = Url::from_file_path(&path) {
                files.push(uri);
            }
        }
    }
}
