use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::debug;

use crate::util::utf16_to_byte_offset;

/// templateUrl / styleUrls に書かれるパスの文字
static RESOURCE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w./-]+").expect("resource word pattern is valid"));

/// 定義ジャンプの対象となる拡張子（複数行の配列要素の末尾カンマも許容）
static RESOURCE_EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(html|s?css|less),?$").expect("resource extension pattern is valid")
});

/// カーソル位置にあるリソースパスを取得
///
/// 単語の終端にカーソルがある場合も含める。
pub fn resource_path_at(line: &str, character: u32) -> Option<&str> {
    let offset = utf16_to_byte_offset(line, character);
    let word = RESOURCE_WORD_RE
        .find_iter(line)
        .find(|m| m.start() <= offset && offset <= m.end())?
        .as_str();

    if !RESOURCE_EXTENSION_RE.is_match(word) {
        return None;
    }
    Some(word.trim_end_matches(','))
}

/// ドキュメントのディレクトリを起点にリソースパスを解決（`.` と `..` は字句的に畳む）
pub fn resolve_resource_path(document_path: &Path, resource: &str) -> PathBuf {
    let base = document_path.parent().unwrap_or(Path::new(""));
    let mut resolved = PathBuf::new();
    for component in base.join(resource).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

/// templateUrl / styleUrls のパスから対象ファイルへの定義を返す
///
/// ファイルが存在しない場合は `None`。位置は常にファイル先頭。
pub async fn goto_resource_definition(
    uri: &Url,
    line: &str,
    position: Position,
) -> Option<Location> {
    let resource = resource_path_at(line, position.character)?;
    let document_path = uri.to_file_path().ok()?;
    let target = resolve_resource_path(&document_path, resource);

    if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
        debug!("goto_resource_definition: {} does not exist", target.display());
        return None;
    }

    let target_uri = Url::from_file_path(&target).ok()?;
    Some(Location {
        uri: target_uri,
        range: Range::new(Position::new(0, 0), Position::new(0, 0)),
    })
}
