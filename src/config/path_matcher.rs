use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// パスマッチング用の構造体
#[derive(Debug, Clone)]
pub struct PathMatcher {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

/// `*` がパス区切りを跨がないglobを生成
fn build_glob(pattern: &str) -> Result<Glob, ConfigError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

impl PathMatcher {
    /// include/excludeパターンからPathMatcherを作成
    ///
    /// 不正なincludeパターンはエラーにする。除外パターンはユーザー設定由来なので、
    /// 不正なものは警告を出して無視する。
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        let include_set = if include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in include {
                builder.add(build_glob(pattern)?);
            }
            Some(builder.build()?)
        };

        let mut exclude_builder = GlobSetBuilder::new();
        for pattern in exclude {
            match build_glob(pattern) {
                Ok(glob) => {
                    exclude_builder.add(glob);
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        Ok(Self {
            include: include_set,
            exclude: exclude_builder.build()?,
        })
    }

    /// ファイルが検索対象かどうかを判定
    pub fn should_include(&self, relative_path: &Path) -> bool {
        if self.exclude.is_match(relative_path) {
            return false;
        }
        match &self.include {
            Some(include_set) => include_set.is_match(relative_path),
            None => true,
        }
    }

    /// ディレクトリを走査すべきかどうかを判定（excludeのみチェック）
    pub fn should_traverse_dir(&self, relative_path: &Path) -> bool {
        !self.exclude.is_match(relative_path)
    }
}
