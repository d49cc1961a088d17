//! Text signals: whitespace normalization, keywords, and research intent.

pub mod intent;
pub mod keywords;
pub mod normalize;

pub use intent::{classify, classify_query};
pub use keywords::{DEFAULT_TOP_N, extract_keywords};
pub use normalize::{is_ready, normalize, truncate_chars};
