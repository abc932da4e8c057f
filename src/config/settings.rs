use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

/// `workspace/configuration` で問い合わせるセクション（この順でマージする）
pub const EXCLUDE_SECTIONS: [&str; 2] = ["files.exclude", "search.exclude"];

/// globパターン -> 有効フラグ（JSONのキー順を保持）
pub type ExcludeMap = Map<String, Value>;

/// 除外設定のスナップショット
///
/// `.vscode/settings.json` と同じフラットなキーで読み込む。
#[derive(Debug, Clone, Deserialize)]
pub struct ExcludeSettings {
    #[serde(rename = "files.exclude", default = "default_files_exclude")]
    pub files_exclude: ExcludeMap,
    #[serde(rename = "search.exclude", default = "default_search_exclude")]
    pub search_exclude: ExcludeMap,
}

fn exclude_map(patterns: &[&str]) -> ExcludeMap {
    patterns
        .iter()
        .map(|p| (p.to_string(), Value::Bool(true)))
        .collect()
}

fn default_files_exclude() -> ExcludeMap {
    exclude_map(&[
        "**/.git",
        "**/.svn",
        "**/.hg",
        "**/CVS",
        "**/.DS_Store",
        "**/Thumbs.db",
    ])
}

fn default_search_exclude() -> ExcludeMap {
    exclude_map(&["**/node_modules", "**/bower_components", "**/*.code-search"])
}

impl Default for ExcludeSettings {
    fn default() -> Self {
        Self {
            files_exclude: default_files_exclude(),
            search_exclude: default_search_exclude(),
        }
    }
}

/// 値が除外を有効にするかどうか
///
/// `true` と条件付き除外（`{"when": ...}`）を有効とみなす。
fn is_enabled(value: &Value) -> bool {
    match value {
        Value::Bool(enabled) => *enabled,
        Value::Object(_) => true,
        _ => false,
    }
}

impl ExcludeSettings {
    pub fn new(files_exclude: ExcludeMap, search_exclude: ExcludeMap) -> Self {
        Self {
            files_exclude,
            search_exclude,
        }
    }

    /// 指定ディレクトリから .vscode/settings.json を読み込む
    pub fn load_from_dir(dir: &Path) -> Self {
        let settings_path = dir.join(".vscode").join("settings.json");
        Self::load_from_path(&settings_path)
    }

    /// 指定パスから設定ファイルを読み込む
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// クライアントの応答を優先し、足りない部分を設定ファイル→既定値で補う
    ///
    /// `values` は [`EXCLUDE_SECTIONS`] の順に並んだ `workspace/configuration` の応答。
    pub fn resolve(values: Option<Vec<Value>>, root: Option<&Path>) -> Self {
        let mut settings = root.map(Self::load_from_dir).unwrap_or_default();

        let mut values = values.unwrap_or_default().into_iter();
        if let Some(Value::Object(map)) = values.next() {
            settings.files_exclude = map;
        }
        if let Some(Value::Object(map)) = values.next() {
            settings.search_exclude = map;
        }

        settings
    }

    /// 2つのマップをマージし、有効なキーだけを集める
    ///
    /// 同じキーは最初の位置を保ったまま後のセクションの値で上書きする。
    pub fn exclusion_glob(&self) -> ExcludeGlob {
        let mut merged = self.files_exclude.clone();
        for (pattern, value) in &self.search_exclude {
            merged.insert(pattern.clone(), value.clone());
        }

        ExcludeGlob::new(
            merged
                .into_iter()
                .filter(|(_, value)| is_enabled(value))
                .map(|(pattern, _)| pattern)
                .collect(),
        )
    }
}

/// 除外globのグループ。表示形式は `{a,b}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeGlob {
    patterns: Vec<String>,
}

impl ExcludeGlob {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl fmt::Display for ExcludeGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.patterns.join(","))
    }
}
