use tower_lsp::lsp_types::{Position, Range};

/// 位置情報の統一型（0始まりの行・列、列はUTF-16単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// 開始位置が終了位置より後ろにならないかチェック
    pub fn is_ordered(&self) -> bool {
        (self.start_line, self.start_col) <= (self.end_line, self.end_col)
    }

    /// 他のスパンと重なるかチェック（端点の接触は重なりとみなさない）
    pub fn overlaps(&self, other: &Span) -> bool {
        (self.start_line, self.start_col) < (other.end_line, other.end_col)
            && (other.start_line, other.start_col) < (self.end_line, self.end_col)
    }

    /// LSP Range に変換
    pub fn to_lsp_range(&self) -> Range {
        Range {
            start: Position {
                line: self.start_line,
                character: self.start_col,
            },
            end: Position {
                line: self.end_line,
                character: self.end_col,
            },
        }
    }
}
