pub mod path_matcher;
pub mod settings;

pub use path_matcher::PathMatcher;
pub use settings::{EXCLUDE_SECTIONS, ExcludeGlob, ExcludeMap, ExcludeSettings};
