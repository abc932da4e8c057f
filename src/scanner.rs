//! テンプレート本文からセレクタの使用箇所を走査する

use crate::model::Span;
use crate::selector::SelectorMatcher;
use crate::util::utf16_len;

/// 絶対バイトオフセットを行・列に変換するための行頭テーブル
#[derive(Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    /// バイトオフセットの位置を (行, UTF-16列) で返す
    ///
    /// オフセットは文字境界を指している必要がある。範囲外は末尾に丸める。
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let col = self
            .text
            .get(line_start..offset)
            .map(utf16_len)
            .unwrap_or(0);
        (line as u32, col)
    }

    /// バイト範囲をスパンに変換
    pub fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_col) = self.position(start);
        let (end_line, end_col) = self.position(end);
        Span::new(start_line, start_col, end_line, end_col)
    }
}

/// ドキュメント全体を走査し、セレクタ名の出現位置を先頭から順に返す
///
/// 次の検索は直前に見つけたセレクタ名の終端から再開する。後続の境界文字は
/// 次の出現の先行境界として再利用できる（`<div a a>` の2つ目の `a`）。
pub fn scan_document(matcher: &SelectorMatcher, text: &str) -> Vec<Span> {
    let index = LineIndex::new(text);
    let mut spans = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let Some(name) = matcher.find_at(text, cursor) else {
            break;
        };
        spans.push(index.span(name.start, name.end));
        cursor = name.end;
    }

    spans
}
