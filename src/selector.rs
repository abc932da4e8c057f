//! コンポーネント/ディレクティブのセレクタ宣言からテンプレート検索用のマッチャーを生成する
//!
//! CSSセレクタを完全には解析しない。カンマ区切りの各要素の先頭にある
//! 識別子だけを取り出し、要素形式（`app-hero`）と属性形式（`[heroProp]`）の
//! 2種類の正規表現に変換して OR で結合する。

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// `selector: '...'` 宣言。クォートは `'` `"` `` ` `` のいずれも受け付ける
static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"selector\s*:\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#)
        .expect("declaration pattern is valid")
});

/// カンマ区切り要素の先頭トークン（開き括弧、識別子、閉じ括弧）
static ALTERNATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\[?)([\w-]+)(\]?)").expect("alternative pattern is valid")
});

/// セレクタ要素の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// `<name ...>` として使われる要素セレクタ
    Element,
    /// `name` / `[name]` / `[(name)]` / `*name` として使われる属性セレクタ
    Attribute,
}

/// カンマ区切りセレクタの1要素
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorAlternative {
    pub kind: SelectorKind,
    pub name: String,
}

impl SelectorAlternative {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Element,
            name: name.into(),
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Attribute,
            name: name.into(),
        }
    }

    /// 1要素を解析する。先頭が識別子の形をしていなければ `None`
    ///
    /// `:not(...)` などの後続部分は読み飛ばす。
    pub fn parse(part: &str) -> Option<Self> {
        let caps = ALTERNATIVE_RE.captures(part)?;
        let name = caps.get(2)?.as_str();
        if caps[1].is_empty() {
            Some(Self::element(name))
        } else {
            Some(Self::attribute(name))
        }
    }

    /// 正規表現の断片。セレクタ名はキャプチャグループになる
    ///
    /// - 要素: 直前が `<`、直後が `>` `/` 空白
    /// - 属性: 直前が 空白 `[` `*` または `[(`、直後が `=` `>` `)` `]` `/` 空白
    fn pattern(&self) -> String {
        let name = regex::escape(&self.name);
        match self.kind {
            SelectorKind::Element => format!(r"<({name})[>/\s]"),
            SelectorKind::Attribute => format!(r"(?:[\s\[*]|\[\()({name})[=>)\]/\s]"),
        }
    }
}

/// セレクタ宣言の行から、クォート内のセレクタ文字列を取り出す
pub fn parse_selector_declaration(line: &str) -> Option<&str> {
    let caps = DECLARATION_RE.captures(line)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

/// セレクタ文字列をカンマで分割して各要素を解析する。解析できない要素は捨てる
pub fn parse_selector_alternatives(selector: &str) -> Vec<SelectorAlternative> {
    selector
        .split(',')
        .filter_map(|part| {
            let alternative = SelectorAlternative::parse(part);
            if alternative.is_none() {
                debug!("parse_selector_alternatives: skipping '{}'", part.trim());
            }
            alternative
        })
        .collect()
}

/// セレクタ宣言の行からマッチャーを生成する
///
/// 宣言が見つからない、または有効な要素が1つもない場合は `None`。
pub fn compile_selector_matcher(declaration: &str) -> Option<SelectorMatcher> {
    let selector = parse_selector_declaration(declaration)?;
    SelectorMatcher::new(parse_selector_alternatives(selector))
}

/// 全要素を OR で結合したマッチャー
#[derive(Debug, Clone)]
pub struct SelectorMatcher {
    alternatives: Vec<SelectorAlternative>,
    regex: Regex,
}

impl SelectorMatcher {
    pub fn new(alternatives: Vec<SelectorAlternative>) -> Option<Self> {
        if alternatives.is_empty() {
            return None;
        }

        let pattern = alternatives
            .iter()
            .map(SelectorAlternative::pattern)
            .collect::<Vec<_>>()
            .join("|");
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(e) => {
                debug!("SelectorMatcher: failed to compile '{}': {}", pattern, e);
                return None;
            }
        };

        Some(Self {
            alternatives,
            regex,
        })
    }

    pub fn alternatives(&self) -> &[SelectorAlternative] {
        &self.alternatives
    }

    /// 表示用のセレクタ名一覧（カンマ区切り）
    pub fn names(&self) -> String {
        self.alternatives
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `start` バイト目以降で最初に見つかったセレクタ名のバイト範囲（境界文字は含まない）
    ///
    /// 各要素の断片はセレクタ名のキャプチャグループを1つだけ持つ。
    pub fn find_at(&self, text: &str, start: usize) -> Option<Range<usize>> {
        let caps = self.regex.captures_at(text, start)?;
        caps.iter().skip(1).flatten().next().map(|m| m.range())
    }
}
