use tower_lsp::lsp_types::Url;

/// ファイルがHTMLテンプレート（`.html`）かどうか判定
pub fn is_html_file(uri: &Url) -> bool {
    uri.path().ends_with(".html")
}

/// 指定行のテキストを取得（改行文字は含まない）
pub fn line_at(text: &str, line: u32) -> Option<&str> {
    text.lines().nth(line as usize)
}

/// 文字列の長さをUTF-16コード単位で数える（LSPの列番号）
pub fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

/// UTF-16の列番号を行内のバイトオフセットに変換
///
/// 行末を超える列は行末に丸める。サロゲートペアの途中を指す場合は
/// その文字の先頭に寄せる。
pub fn utf16_to_byte_offset(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (offset, c) in line.char_indices() {
        let next = units + c.len_utf16() as u32;
        if next > character {
            return offset;
        }
        units = next;
    }
    line.len()
}
