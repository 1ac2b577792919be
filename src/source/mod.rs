//! Source resolution and caching

pub mod cache;
pub mod resolver;

pub use cache::{CacheManager, CachedText};
pub use resolver::{resolve_base64, resolve_path, resolve_url, DocumentKind, ResolvedDocument};
