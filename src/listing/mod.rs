//! Directory listing and caching
//!
//! - [`DirectoryLister`] normalises raw bridge entries into [`FileEntry`]
//! - [`DirectoryCache`] keeps recent listings per connection attempt
//! - `path_utils` handles local/remote path semantics for navigation

mod cache;
mod format;
mod lister;
pub mod path_utils;
mod types;

pub use cache::{CacheEntry, CacheKey, DirectoryCache};
pub use format::{format_size, parse_size, parse_timestamp};
pub use lister::DirectoryLister;
pub use types::{FileEntry, FileKind};
